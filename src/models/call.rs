use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record of one completed API call, written to the call log sink
///
/// Created after the wrapped handler returns, rendered to text, appended to
/// the sink and discarded. Never retained or queried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCallLog {
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub path: String,
    /// Full request URL (scheme + host + path + query when known)
    pub url: String,
    pub status: u16,
    /// Wall-clock time spent in the downstream handler, in milliseconds
    pub duration_ms: f64,
    /// Decoded request body text; `None` when the body was empty
    pub request_body: Option<String>,
    /// Decoded response body text
    pub response_body: String,
}

impl ApiCallLog {
    /// Render this record as one log-file entry
    ///
    /// Layout: timestamp header, method/path line, full URL, status,
    /// duration with two decimals, optional request body block, response
    /// body block, then a separator line and a blank line.
    pub fn render(&self) -> String {
        let mut parts = vec![
            format!("{} {}", self.method, self.path),
            format!("Full URL: {}", self.url),
            format!("Status: {}", self.status),
            format!("Duration: {:.2}ms", self.duration_ms),
        ];

        if let Some(body) = self.request_body.as_deref().filter(|b| !b.is_empty()) {
            parts.push(format!("Request Body:\n{}", body));
        }

        parts.push(format!("Response:\n{}", self.response_body));

        format!(
            "[{}]\n{}\n{}\n\n",
            self.timestamp.to_rfc3339(),
            parts.join("\n"),
            "─".repeat(50)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_entry() -> ApiCallLog {
        ApiCallLog {
            timestamp: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            method: "POST".to_string(),
            path: "/tasks".to_string(),
            url: "http://localhost:8000/tasks".to_string(),
            status: 201,
            duration_ms: 12.3456,
            request_body: Some("{\n  \"title\": \"walk\"\n}".to_string()),
            response_body: "{\n  \"id\": 1\n}".to_string(),
        }
    }

    #[test]
    fn test_render_full_entry() {
        let rendered = sample_entry().render();

        assert!(rendered.starts_with("[2026-01-02T03:04:05+00:00]\n"));
        assert!(rendered.contains("POST /tasks\n"));
        assert!(rendered.contains("Full URL: http://localhost:8000/tasks\n"));
        assert!(rendered.contains("Status: 201\n"));
        assert!(rendered.contains("Duration: 12.35ms\n"));
        assert!(rendered.contains("Request Body:\n{\n  \"title\": \"walk\"\n}\n"));
        assert!(rendered.contains("Response:\n{\n  \"id\": 1\n}\n"));
        assert!(rendered.ends_with(&format!("{}\n\n", "─".repeat(50))));
    }

    #[test]
    fn test_render_omits_empty_request_body() {
        let mut entry = sample_entry();
        entry.request_body = None;
        assert!(!entry.render().contains("Request Body:"));

        entry.request_body = Some(String::new());
        assert!(!entry.render().contains("Request Body:"));
    }

    #[test]
    fn test_render_duration_two_decimals() {
        let mut entry = sample_entry();
        entry.duration_ms = 0.5;
        assert!(entry.render().contains("Duration: 0.50ms\n"));
    }
}
