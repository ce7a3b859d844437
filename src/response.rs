//! Response normalization.
//!
//! SDP responses come in two families. Most write operations answer with a
//! flat `result{status,message}` block plus `Details/parameter*`, which
//! [`parse_simple`] turns into an [`OperationResult`]. Everything else
//! (lists, conversations, filters, nested detail trees) is converted
//! generically by [`parse_generic`] and left for the caller to navigate.

use serde_json::Value;

use crate::error::SdpError;
use crate::models::{OperationResult, STATUS_SUCCESS};
use crate::xml::XmlElement;

/// Parses a direct-mode response.
///
/// The first `result` element supplies the status and message. Only when
/// the status is exactly `Success` are the `parameter` children of every
/// `Details` element flattened into the result; a name that appears in
/// several blocks keeps the value from the last one.
///
/// # Errors
///
/// Returns an XML error for a malformed body and
/// `SdpError::MissingElement` if there is no `result` or `result/status`.
pub fn parse_simple(body: &str) -> Result<OperationResult, SdpError> {
    let root = XmlElement::parse(body)?;

    let result = root
        .descendants("result")
        .next()
        .ok_or_else(|| SdpError::missing_element("result"))?;
    let status = result
        .child("status")
        .ok_or_else(|| SdpError::missing_element("result/status"))?;

    let mut parsed = OperationResult {
        status: status.text().unwrap_or_default().to_string(),
        message: result
            .child("message")
            .and_then(XmlElement::text)
            .map(str::to_string),
        ..Default::default()
    };

    if parsed.status != STATUS_SUCCESS {
        return Ok(parsed);
    }

    for details in root.descendants("Details") {
        for param in details.children("parameter") {
            let Some(name) = param.child("name") else {
                continue;
            };
            let value = param
                .child("value")
                .and_then(XmlElement::text)
                .map(str::to_string);
            parsed
                .parameters
                .insert(name.text().unwrap_or_default().to_string(), value);
        }
    }

    Ok(parsed)
}

/// Parses a generic-mode response into a JSON-compatible tree.
pub fn parse_generic(body: &str) -> Result<Value, SdpError> {
    crate::xml::xml_to_value(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    const ADD_REQUEST_OK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<operation name="ADD_REQUEST">
  <result>
    <statuscode>200</statuscode>
    <status>Success</status>
    <message>Request added successfully</message>
  </result>
  <Details>
    <parameter><name>workorderid</name><value>198952</value></parameter>
    <parameter><name>subject</name><value>Test call</value></parameter>
    <parameter><name>technician</name><value/></parameter>
  </Details>
</operation>"#;

    #[test]
    fn test_success_flattens_parameters() {
        let result = parse_simple(ADD_REQUEST_OK).unwrap();
        assert!(result.is_success());
        assert_eq!(result.display_message(), "Request added successfully");
        assert_eq!(
            result.parameters,
            BTreeMap::from([
                ("workorderid".to_string(), Some("198952".to_string())),
                ("subject".to_string(), Some("Test call".to_string())),
                ("technician".to_string(), None),
            ])
        );
    }

    #[test]
    fn test_later_details_block_wins() {
        let body = "<operation><result><status>Success</status><message>ok</message></result>\
                    <Details><parameter><name>status</name><value>Open</value></parameter>\
                    <parameter><name>subject</name><value>A</value></parameter></Details>\
                    <Details><parameter><name>status</name><value>Closed</value></parameter></Details>\
                    </operation>";
        let result = parse_simple(body).unwrap();
        assert_eq!(result.get("status"), Some("Closed"));
        assert_eq!(result.get("subject"), Some("A"));
    }

    #[test]
    fn test_failure_keeps_only_status_and_message() {
        let body = "<operation><result><status>Failed</status>\
                    <message>Request not found</message></result>\
                    <Details><parameter><name>workorderid</name><value>1</value></parameter></Details>\
                    </operation>";
        let result = parse_simple(body).unwrap();
        assert!(!result.is_success());
        assert!(result.parameters.is_empty());
        assert_eq!(result.to_map().len(), 2);
        assert_eq!(result.message.as_deref(), Some("Request not found"));
    }

    #[test]
    fn test_nested_details_are_found() {
        let body = "<API><response><operation><result><status>Success</status></result>\
                    <Details><Notes><Note/></Notes></Details>\
                    <Details><parameter><name>notesText</name><value>hi</value></parameter></Details>\
                    </operation></response></API>";
        let result = parse_simple(body).unwrap();
        assert_eq!(result.message, None);
        assert_eq!(result.get("notesText"), Some("hi"));
    }

    #[test]
    fn test_parameter_text_is_kept_verbatim() {
        let body = "<operation>\n  <result>\n    <status>Success</status>\n  </result>\n  <Details>\n\
                    <parameter><name>description</name><value>  indented line\n</value></parameter>\n\
                    <parameter><name>blank</name><value>   </value></parameter>\n\
                    </Details>\n</operation>";
        let result = parse_simple(body).unwrap();
        assert!(result.is_success());
        assert_eq!(result.get("description"), Some("  indented line\n"));
        assert_eq!(result.get("blank"), Some("   "));
    }

    #[test]
    fn test_first_result_element_is_used() {
        let body = "<operation><result><status>Success</status><message>first</message></result>\
                    <extra><result><status>Failed</status><message>second</message></result></extra>\
                    </operation>";
        let result = parse_simple(body).unwrap();
        assert!(result.is_success());
        assert_eq!(result.display_message(), "first");
    }

    #[test]
    fn test_missing_result_is_error() {
        let err = parse_simple("<operation><Details/></operation>").unwrap_err();
        assert!(matches!(err, SdpError::MissingElement(ref e) if e == "result"));
    }

    #[test]
    fn test_missing_status_is_error() {
        let err = parse_simple("<operation><result><message>m</message></result></operation>")
            .unwrap_err();
        assert!(matches!(err, SdpError::MissingElement(_)));
    }

    #[test]
    fn test_malformed_body_is_error() {
        let err = parse_simple("<html><body>502 Bad Gateway</body>").unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_parse_generic_returns_tree() {
        let value = parse_generic(ADD_REQUEST_OK).unwrap();
        assert_eq!(value["operation"]["@name"], "ADD_REQUEST");
        assert_eq!(value["operation"]["result"]["status"], "Success");
        assert_eq!(value["operation"]["Details"]["parameter"][0]["value"], "198952");
    }
}
