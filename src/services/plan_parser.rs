use crate::error::AppError;
use crate::models::plan::ProposedChange;

/// Pulls the JSON body out of a model reply: a ```json fence first, then any
/// fence, then the outermost `[...]` span.
pub fn extract_json_payload(text: &str) -> Option<String> {
    let trimmed = text.trim();

    if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + "```json".len()..];
        if let Some(end) = rest.find("```") {
            return Some(rest[..end].trim().to_string());
        }
    }

    if let Some(start) = trimmed.find("```") {
        let rest = &trimmed[start + 3..];
        if let Some(newline) = rest.find('\n') {
            let body = &rest[newline + 1..];
            if let Some(end) = body.find("```") {
                return Some(body[..end].trim().to_string());
            }
        }
    }

    let first = trimmed.find('[')?;
    let last = trimmed.rfind(']')?;
    if first <= last {
        return Some(trimmed[first..=last].to_string());
    }

    None
}

/// Parses a plan from either a raw model reply or a plain JSON plan file.
pub fn parse_plan(text: &str) -> Result<Vec<ProposedChange>, AppError> {
    let payload = extract_json_payload(text).ok_or_else(|| {
        AppError::MalformedPlan("response did not contain a JSON array".to_string())
    })?;
    serde_json::from_str(&payload).map_err(|e| AppError::MalformedPlan(e.to_string()))
}

pub fn plan_to_json(plan: &[ProposedChange]) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(plan)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_payload_handles_codeblock() {
        let text = "Here you go:\n```json\n[{\"folderName\": \"Docs\"}]\n```\nDone.";
        let payload = extract_json_payload(text).unwrap();
        assert_eq!(payload, "[{\"folderName\": \"Docs\"}]");
    }

    #[test]
    fn extract_json_payload_handles_unlabeled_fence() {
        let text = "```\n[1, 2]\n```";
        assert_eq!(extract_json_payload(text).unwrap(), "[1, 2]");
    }

    #[test]
    fn extract_json_payload_handles_bare_array() {
        let text = "<think>grouping...</think>\n[{\"a\": [1]}] trailing";
        assert_eq!(extract_json_payload(text).unwrap(), "[{\"a\": [1]}]");
    }

    #[test]
    fn extract_json_payload_rejects_plain_text() {
        assert!(extract_json_payload("no structure here").is_none());
    }

    #[test]
    fn parse_plan_reads_model_reply() {
        let text = r#"```json
[
  {"folderName": "Project Reports Q3", "filesToMove": ["report.docx", "q3.xlsx"], "isNewFolder": true},
  {"folderName": "Existing Folder/Images", "filesToMove": ["logo.png"], "isNewFolder": false}
]
```"#;
        let plan = parse_plan(text).unwrap();

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].folder_name, "Project Reports Q3");
        assert_eq!(plan[0].files_to_move, vec!["report.docx", "q3.xlsx"]);
        assert!(plan[0].is_new_folder);
        assert!(!plan[1].is_new_folder);
    }

    #[test]
    fn parse_plan_rejects_wrong_shape() {
        let err = parse_plan(r#"[{"folder": "Docs"}]"#).unwrap_err();
        assert!(matches!(err, AppError::MalformedPlan(_)));

        let err = parse_plan("I could not decide.").unwrap_err();
        assert!(matches!(err, AppError::MalformedPlan(_)));
    }

    #[test]
    fn plan_json_is_readable_back() {
        let plan = vec![ProposedChange::new("Docs", &["a.txt"], true)];
        let json = plan_to_json(&plan).unwrap();
        assert!(json.contains("\"folderName\": \"Docs\""));
        assert_eq!(parse_plan(&json).unwrap(), plan);
    }
}
