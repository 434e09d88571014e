use serde_derive::Serialize;

/// Optional parameters for `POST /api/connection`.
///
/// Unset fields are left out of the request body entirely, so OctoPrint falls
/// back to its own saved or auto-detected values for them.
#[allow(unused)]
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baudrate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printer_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoconnect: Option<bool>,
}

// //////////////// //
// Request payloads //
// //////////////// //

#[derive(Debug, Serialize)]
pub(super) struct ConnectCommand<'a> {
    pub command: &'static str,
    #[serde(flatten)]
    pub options: &'a ConnectOptions,
}

#[derive(Debug, Serialize)]
pub(super) struct SimpleCommand {
    pub command: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct TargetTemperature {
    pub command: &'static str,
    pub target: u16,
}

#[derive(Debug, Serialize)]
pub(super) struct GcodeCommands<'a> {
    pub commands: &'a [String],
}

#[derive(Debug, Serialize)]
pub(super) struct SelectFile {
    pub command: &'static str,
    pub print: bool,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn connect_sends_only_provided_options() {
        let options = ConnectOptions { baudrate: Some(115200), save: Some(false), ..Default::default() };
        let payload = serde_json::to_value(ConnectCommand { command: "connect", options: &options }).unwrap();

        assert_eq!(payload, json!({ "command": "connect", "baudrate": 115200, "save": false }));
    }

    #[test]
    fn connect_uses_octoprint_field_names() {
        let options = ConnectOptions { printer_profile: Some("_default".into()), ..Default::default() };
        let payload = serde_json::to_value(ConnectCommand { command: "connect", options: &options }).unwrap();

        assert_eq!(payload, json!({ "command": "connect", "printerProfile": "_default" }));
    }
}
