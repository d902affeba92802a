use serde::Deserialize;

/// Used when a failed response names no reason at all.
pub const GENERIC_FAILURE: &str = "Request failed";

/// Response wrapper every API route answers with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// `error`, else `message`. Blank strings count as absent.
    pub fn reason(&self) -> Option<&str> {
        [self.error.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|text| !text.is_empty())
    }

    /// [`Self::reason`], else [`GENERIC_FAILURE`].
    pub fn failure_text(&self) -> String {
        self.reason().unwrap_or(GENERIC_FAILURE).to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    use super::*;

    fn parse(json: &str) -> ApiEnvelope<Value> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn error_field_wins_over_message() {
        let envelope = parse(r#"{"success":false,"error":"用戶ID不能為空","message":"ignored"}"#);
        assert_eq!(envelope.failure_text(), "用戶ID不能為空");
    }

    #[test]
    fn message_used_when_error_blank() {
        let envelope = parse(r#"{"success":false,"error":"  ","message":"帳單不存在"}"#);
        assert_eq!(envelope.failure_text(), "帳單不存在");
    }

    #[test]
    fn generic_text_when_nothing_given() {
        let envelope = parse(r#"{"success":false}"#);
        assert_eq!(envelope.failure_text(), GENERIC_FAILURE);
        assert_eq!(envelope.reason(), None);
    }

    #[test]
    fn missing_data_is_none() {
        let envelope = parse(r#"{"success":true,"message":"ok"}"#);
        assert!(envelope.success);
        assert_eq!(envelope.data, None);
    }
}
