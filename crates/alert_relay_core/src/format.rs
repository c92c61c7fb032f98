use crate::extract::ExtractedAlert;

/// SNS requires subjects of less than 100 characters.
pub const MAX_SUBJECT_CHARS: usize = 99;
/// SNS message size limit, in UTF-8 bytes.
pub const MAX_BODY_BYTES: usize = 256 * 1024;
pub const TRUNCATION_MARKER: &str = " ...[truncated]";

const BANNER: &str = "================================================";
const RULE: &str = "-----------------------------------------------";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub subject: String,
    pub body: String,
}

pub fn format_alert(alert: &ExtractedAlert) -> Alert {
    Alert {
        subject: format_subject(&alert.source_name),
        body: format_body(alert),
    }
}

fn format_subject(source_name: &str) -> String {
    format!("Error in Lambda Function: {source_name}")
        .chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .take(MAX_SUBJECT_CHARS)
        .collect()
}

fn format_body(alert: &ExtractedAlert) -> String {
    let render = |error_message: &str| {
        format!(
            "{BANNER}\n\
             Lambda Function Error Details\n\
             {RULE}\n\
             Lambda Function Name: {}\n\
             Log Group: {}\n\
             Log Stream: {}\n\
             Error Message: {error_message}\n\
             {BANNER}\n",
            alert.source_name, alert.log_group, alert.log_stream,
        )
    };

    let body = render(&alert.error_message);
    if body.len() <= MAX_BODY_BYTES {
        return body;
    }

    let overhead = body.len() - alert.error_message.len() + TRUNCATION_MARKER.len();
    let budget = MAX_BODY_BYTES.saturating_sub(overhead);
    let mut message = truncate_to_char_boundary(&alert.error_message, budget).to_string();
    message.push_str(TRUNCATION_MARKER);
    render(&message)
}

fn truncate_to_char_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
