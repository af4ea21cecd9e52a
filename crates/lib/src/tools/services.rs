//! Placeholder e-governance services behind the four tool names.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use super::call::ToolRequest;
use super::lookup;

/// Services a decoded tool request and produces the user-visible reply.
pub trait ToolExecutor: Send + Sync {
    fn execute(&self, request: &ToolRequest) -> String;
}

/// Issues `GRV-<n>` ids: `n` starts at the current unix second and strictly increases.
#[derive(Debug, Default)]
pub struct GrievanceIds {
    last: AtomicU64,
}

impl GrievanceIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return format!("GRV-{}", candidate),
                Err(actual) => prev = actual,
            }
        }
    }
}

/// The four citizen services backed by static lookup tables.
#[derive(Debug, Default)]
pub struct CitizenServices {
    grievance_ids: GrievanceIds,
}

impl CitizenServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch_scheme_info(&self, scheme_name: &str) -> String {
        let info = lookup::scheme_info(scheme_name).unwrap_or(lookup::SCHEME_NOT_FOUND);
        format!("Scheme Information: {}", info)
    }

    pub fn raise_grievance(&self, _description: Option<&str>) -> String {
        let id = self.grievance_ids.next();
        log::info!("grievance registered: {}", id);
        format!(
            "Your grievance has been successfully submitted. Your grievance ID is {}.",
            id
        )
    }

    pub fn track_application(&self, application_id: &str) -> String {
        let status =
            lookup::application_status(application_id).unwrap_or(lookup::APPLICATION_NOT_FOUND);
        format!("Application Status: {}", status)
    }

    pub fn collect_feedback(&self, feedback: &str) -> String {
        format!(
            "Thank you for your feedback: '{}'. Your feedback is valuable and will be reviewed.",
            feedback
        )
    }
}

impl ToolExecutor for CitizenServices {
    fn execute(&self, request: &ToolRequest) -> String {
        match request {
            ToolRequest::FetchSchemeInfo { scheme_name } => self.fetch_scheme_info(scheme_name),
            ToolRequest::RaiseGrievance {
                grievance_description,
            } => self.raise_grievance(grievance_description.as_deref()),
            ToolRequest::TrackApplication { application_id } => {
                self.track_application(application_id)
            }
            ToolRequest::CitizenFeedback { feedback } => self.collect_feedback(feedback),
            ToolRequest::Unrecognized { name } => {
                log::warn!("tools: model requested unknown tool '{}'", name);
                format!("The requested service '{}' is not available.", name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grievance_number(reply: &str) -> u64 {
        let rest = reply
            .strip_prefix("Your grievance has been successfully submitted. Your grievance ID is GRV-")
            .expect("grievance template");
        rest.strip_suffix('.').unwrap().parse().unwrap()
    }

    #[test]
    fn scheme_info_template() {
        let s = CitizenServices::new();
        assert_eq!(
            s.fetch_scheme_info("PMAY"),
            "Scheme Information: Pradhan Mantri Awas Yojana is a scheme by the Government of India to provide affordable housing to the urban poor."
        );
        assert_eq!(
            s.fetch_scheme_info("Pmay"),
            s.fetch_scheme_info("pmay")
        );
        assert_eq!(
            s.fetch_scheme_info("unknown"),
            "Scheme Information: Scheme information not available."
        );
    }

    #[test]
    fn application_tracking_template_and_idempotence() {
        let s = CitizenServices::new();
        let first = s.track_application("app1234");
        assert_eq!(
            first,
            "Application Status: Your application is currently under review."
        );
        assert_eq!(s.track_application("app1234"), first);
        assert_eq!(
            s.track_application("unknown"),
            "Application Status: Application ID not found."
        );
    }

    #[test]
    fn grievance_ids_strictly_increase() {
        let s = CitizenServices::new();
        let a = grievance_number(&s.raise_grievance(Some("water supply")));
        let b = grievance_number(&s.raise_grievance(None));
        let c = grievance_number(&s.raise_grievance(Some("roads")));
        assert!(a < b && b < c);
    }

    #[test]
    fn feedback_is_quoted_verbatim() {
        let s = CitizenServices::new();
        assert_eq!(
            s.execute(&ToolRequest::CitizenFeedback {
                feedback: "Portal is slow".to_string()
            }),
            "Thank you for your feedback: 'Portal is slow'. Your feedback is valuable and will be reviewed."
        );
    }

    #[test]
    fn unknown_tool_is_surfaced() {
        let s = CitizenServices::new();
        assert_eq!(
            s.execute(&ToolRequest::Unrecognized {
                name: "book_train".to_string()
            }),
            "The requested service 'book_train' is not available."
        );
    }
}
