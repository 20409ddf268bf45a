use binauthz_voucher::{should_include_vulnerability, FailOn, Severity, Vulnerability};

fn vulnerability(name: &str, severity: Severity) -> Vulnerability {
    Vulnerability {
        name: name.to_string(),
        description: String::new(),
        package: "openssl".to_string(),
        severity,
        affected_version: None,
        fixed_version: None,
        fix_available: false,
    }
}

#[test]
fn test_severity_ordering() {
    assert!(Severity::Unknown < Severity::Negligible);
    assert!(Severity::Negligible < Severity::Low);
    assert!(Severity::Low < Severity::Medium);
    assert!(Severity::Medium < Severity::High);
    assert!(Severity::High < Severity::Critical);
}

#[test]
fn test_inclusion_matches_floor_for_every_pair() {
    for floor in Severity::ALL {
        for severity in Severity::ALL {
            let v = vulnerability("CVE-0000-0001", severity);
            assert_eq!(
                should_include_vulnerability(&v, floor),
                severity >= floor,
                "severity {} with floor {}",
                severity,
                floor
            );
        }
    }
}

#[test]
fn test_floor_is_inclusive() {
    let v = vulnerability("CVE-2021-3711", Severity::High);
    assert!(should_include_vulnerability(&v, Severity::High));
    assert!(!should_include_vulnerability(&v, Severity::Critical));
}

#[test]
fn test_unknown_severity_only_passes_unknown_floor() {
    let v = vulnerability("CVE-2021-0000", Severity::Unknown);
    assert!(should_include_vulnerability(&v, Severity::Unknown));
    assert!(!should_include_vulnerability(&v, Severity::Negligible));
}

#[test]
fn test_fail_on_filter() {
    let vulnerabilities = vec![
        vulnerability("CVE-1", Severity::Low),
        vulnerability("CVE-2", Severity::Medium),
        vulnerability("CVE-3", Severity::Critical),
        vulnerability("CVE-4", Severity::Unknown),
    ];

    let fail_on = FailOn::new(Severity::Medium);
    let names: Vec<String> = fail_on
        .filter(&vulnerabilities)
        .into_iter()
        .map(|v| v.name)
        .collect();
    assert_eq!(names, vec!["CVE-2", "CVE-3"]);

    assert_eq!(FailOn::default().filter(&vulnerabilities).len(), 4);
}

#[test]
fn test_severity_parsing() {
    assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
    assert_eq!("HIGH".parse::<Severity>().unwrap(), Severity::High);
    assert_eq!(" Medium ".parse::<Severity>().unwrap(), Severity::Medium);
    assert!("severe".parse::<Severity>().is_err());

    assert_eq!(Severity::from_store("MINIMAL"), Severity::Negligible);
    assert_eq!(Severity::from_store("SEVERITY_UNSPECIFIED"), Severity::Unknown);
}

#[test]
fn test_severity_serde() {
    let json = serde_json::to_string(&Severity::High).unwrap();
    assert_eq!(json, "\"high\"");
    let parsed: Severity = serde_json::from_str("\"LOW\"").unwrap();
    assert_eq!(parsed, Severity::Low);
}
