use crate::credential::SigningAlgorithm;
use serde::{Deserialize, Deserializer, Serialize};

/// Control API token verification
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// When false the control API accepts unauthenticated requests
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Credential registry file
    #[serde(default = "default_subjects_path")]
    pub subjects_path: String,

    /// Accepted `alg` header values
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<SigningAlgorithm>,

    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Accepted audiences; a single string is accepted as a one-element list
    #[serde(default = "default_audience", deserialize_with = "string_or_list")]
    pub audience: Vec<String>,

    /// Clock skew tolerance for `exp`/`nbf`, in seconds
    #[serde(default = "default_leeway")]
    pub leeway: u64,

    /// How often the registry file is checked for outside changes
    #[serde(default = "default_reload_interval")]
    pub reload_interval_secs: u64,

    #[serde(default)]
    pub options: JwtVerifyOptions,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            subjects_path: default_subjects_path(),
            algorithms: default_algorithms(),
            issuer: default_issuer(),
            audience: default_audience(),
            leeway: default_leeway(),
            reload_interval_secs: default_reload_interval(),
            options: JwtVerifyOptions::default(),
        }
    }
}

/// Independent switches for the claim checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct JwtVerifyOptions {
    #[serde(default = "default_true")]
    pub verify_exp: bool,
    #[serde(default = "default_true")]
    pub verify_nbf: bool,
    #[serde(default = "default_true")]
    pub verify_aud: bool,
    #[serde(default = "default_true")]
    pub verify_iss: bool,
}

impl Default for JwtVerifyOptions {
    fn default() -> Self {
        Self {
            verify_exp: true,
            verify_nbf: true,
            verify_aud: true,
            verify_iss: true,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

fn default_true() -> bool {
    true
}

fn default_subjects_path() -> String {
    "/etc/homedns/jwt_secrets/jwt_subjects.json".to_string()
}

fn default_algorithms() -> Vec<SigningAlgorithm> {
    vec![SigningAlgorithm::Es256]
}

fn default_issuer() -> String {
    "homedns-clients".to_string()
}

fn default_audience() -> Vec<String> {
    vec!["homedns-api".to_string()]
}

fn default_leeway() -> u64 {
    30
}

fn default_reload_interval() -> u64 {
    5
}
