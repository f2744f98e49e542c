use std::net::Ipv4Addr;

/// Names used across the flows.
pub struct TestDomains;

impl TestDomains {
    /// Zone the test server is authoritative for
    pub fn zone() -> &'static str {
        "home.test"
    }

    pub fn nas() -> &'static str {
        "nas.home.test"
    }

    pub fn printer() -> &'static str {
        "printer.home.test"
    }

    /// Outside the zone; answered by the mock upstream
    pub fn external() -> &'static str {
        "www.example.org"
    }

    pub fn upstream_address() -> Ipv4Addr {
        Ipv4Addr::new(192, 0, 2, 10)
    }
}
