use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{
    API_BASE_ENV, Credential, GhscoutConfig, LookupSettings, TOKEN_ENV, load_optional_config,
    resolve_config_path,
};
use crate::github::LookupClient;
use crate::http_transport::{HttpTransport, ReqwestTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Pass,
    Fail,
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorCheck {
    pub name: String,
    pub state: CheckState,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    pub checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    pub fn summary(&self) -> String {
        let passed = self
            .checks
            .iter()
            .filter(|check| check.state == CheckState::Pass)
            .count();
        let failed = self.checks.len().saturating_sub(passed);
        format!("{passed} passed, {failed} failed")
    }
}

#[derive(Debug, Clone, Default)]
pub struct DoctorInputs {
    pub config_path: Option<PathBuf>,
    pub api_base_override: Option<String>,
    pub token: Option<String>,
}

impl DoctorInputs {
    pub fn from_process() -> Self {
        Self {
            config_path: resolve_config_path().ok(),
            api_base_override: std::env::var(API_BASE_ENV).ok(),
            token: std::env::var(TOKEN_ENV).ok(),
        }
    }
}

pub fn run_doctor() -> DoctorReport {
    let inputs = DoctorInputs::from_process();
    match ReqwestTransport::new() {
        Ok(transport) => run_doctor_with(&inputs, Arc::new(transport)),
        Err(error) => {
            let mut report = run_offline_checks(&inputs).0;
            report
                .checks
                .push(fail_check("api reachable", format!("{error:#}")));
            report
        }
    }
}

pub fn run_doctor_with(inputs: &DoctorInputs, transport: Arc<dyn HttpTransport>) -> DoctorReport {
    let (mut report, settings) = run_offline_checks(inputs);

    match settings {
        Some(settings) => report.checks.push(check_api_reachable(settings, transport)),
        None => report
            .checks
            .push(skipped_check("api reachable", "api base url is invalid")),
    }

    report
}

fn run_offline_checks(inputs: &DoctorInputs) -> (DoctorReport, Option<LookupSettings>) {
    let mut checks = Vec::new();
    let mut config: Option<GhscoutConfig> = None;

    match &inputs.config_path {
        Some(path) => match load_optional_config(path) {
            Ok(Some(loaded)) => {
                checks.push(pass_check(
                    "config file",
                    format!("found at {}", path.display()),
                ));
                config = Some(loaded);
            }
            Ok(None) => checks.push(pass_check(
                "config file",
                format!("not present at {}, using defaults", path.display()),
            )),
            Err(error) => checks.push(fail_check("config file", error.to_string())),
        },
        None => checks.push(fail_check(
            "config file",
            "could not resolve home directory for config path",
        )),
    }

    let settings = match LookupSettings::resolve(
        config.as_ref(),
        inputs
            .api_base_override
            .clone()
            .filter(|value| !value.trim().is_empty()),
        inputs.token.clone(),
    ) {
        Ok(settings) => {
            checks.push(pass_check("api base url", settings.api_base.clone()));
            Some(settings)
        }
        Err(error) => {
            checks.push(fail_check("api base url", error.to_string()));
            None
        }
    };

    let token_set = inputs.token.clone().and_then(Credential::new).is_some();
    checks.push(if token_set {
        pass_check("github token", format!("{TOKEN_ENV} is set"))
    } else {
        pass_check(
            "github token",
            format!("{TOKEN_ENV} is not set, requests are unauthenticated and rate-limited"),
        )
    });

    (DoctorReport { checks }, settings)
}

fn check_api_reachable(settings: LookupSettings, transport: Arc<dyn HttpTransport>) -> DoctorCheck {
    let client = LookupClient::new(transport, settings);
    match client.probe_rate_limit() {
        Ok(rate) => pass_check(
            "api reachable",
            format!("{} of {} requests remaining", rate.remaining, rate.limit),
        ),
        Err(error) => fail_check("api reachable", error.to_string()),
    }
}

fn pass_check(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        state: CheckState::Pass,
        details: details.into(),
    }
}

fn fail_check(name: &str, details: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        name: name.to_string(),
        state: CheckState::Fail,
        details: details.into(),
    }
}

fn skipped_check(name: &str, reason: &str) -> DoctorCheck {
    fail_check(name, format!("skipped because {reason}"))
}
