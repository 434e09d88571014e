use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use snafu::{ResultExt, Snafu};
use url::Url;

use crate::config::models::Octoprint;

use super::decoder::{DecodeError, OrMissing, ResponseBody};
use super::models::*;
use super::PrinterApi;

const API_KEY_HEADER: &str = "X-Api-Key";

/// Client for the subset of the OctoPrint REST API this service talks to.
///
/// Every call is a single request without retries. Reads expect `200 OK`,
/// commands expect `204 No Content` (file selection expects `200 OK`).
pub struct OctoprintClient {
    http: Client,
    base_url: Url,
}

#[allow(unused)]
impl OctoprintClient {
    pub fn new(settings: &Octoprint) -> Result<Self, ClientError> {
        let base_url = build_base_url(&settings.host, settings.port)?;
        Self::with_base_url(base_url, &settings.api_key, settings.timeout)
    }

    pub fn with_base_url(base_url: Url, api_key: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_str(api_key).context(InvalidApiKeySnafu)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context(BuildClientSnafu)?;

        Ok(Self { http, base_url })
    }

    // ////////// //
    // Connection //
    // ////////// //

    pub async fn connect_to_printer(&self, options: &ConnectOptions) -> Result<(), ClientError> {
        self.post("api/connection", &ConnectCommand { command: "connect", options }, StatusCode::NO_CONTENT).await
    }

    /// Checks whether OctoPrint reports an attached printer.
    ///
    /// OctoPrint answers `/api/printer` with `409 Conflict` while no printer is
    /// attached, so any status other than `200 OK` means "not connected".
    /// Only transport failures are errors.
    pub async fn is_printer_connected(&self) -> Result<bool, ClientError> {
        let url = self.url("api/printer")?;
        let response = self.http.get(url.clone()).send().await.context(UnreachableSnafu { url: url.as_str() })?;
        Ok(response.status() == StatusCode::OK)
    }

    pub async fn get_printer_status(&self) -> Result<String, ClientError> {
        let url = self.url("api/printer")?;
        let body = self.get("api/printer").await?;
        match body.string("state.text") {
            Err(DecodeError::FieldMissing { .. }) => StatusUnavailableSnafu { url: url.as_str() }.fail(),
            other => other.context(DecodeFailedSnafu { url: url.as_str() }),
        }
    }

    pub async fn get_version(&self) -> Result<String, ClientError> {
        let body = self.get("api/version").await?;
        self.decode("api/version", body.string("server").or_missing("0.0.0".to_string()))
    }

    // /////////// //
    // Temperature //
    // /////////// //

    pub async fn set_bed_temp(&self, target: u16) -> Result<(), ClientError> {
        self.post("api/printer/bed", &TargetTemperature { command: "target", target }, StatusCode::NO_CONTENT).await
    }

    /// Target temperature of the heated bed in degrees Celsius.
    pub async fn get_bed_temp(&self) -> Result<i32, ClientError> {
        let body = self.get("api/printer/bed").await?;
        self.decode("api/printer/bed", body.rounded("bed.target").map(|t| t as i32))
    }

    pub async fn get_extruder_target_temp(&self) -> Result<i32, ClientError> {
        let body = self.get("api/printer/tool").await?;
        self.decode("api/printer/tool", body.rounded("tool0.target").or_missing(0).map(|t| t as i32))
    }

    pub async fn get_extruder_current_temp(&self) -> Result<i32, ClientError> {
        let body = self.get("api/printer/tool").await?;
        self.decode("api/printer/tool", body.rounded("tool0.actual").or_missing(0).map(|t| t as i32))
    }

    // /// //
    // Job //
    // /// //

    pub async fn start_job(&self) -> Result<(), ClientError> {
        self.job_command("start").await
    }

    pub async fn pause_job(&self) -> Result<(), ClientError> {
        self.job_command("pause").await
    }

    /// Sends the same payload as [`Self::pause_job`]; OctoPrint toggles on a bare `pause`.
    pub async fn resume_job(&self) -> Result<(), ClientError> {
        self.job_command("pause").await
    }

    pub async fn cancel_job(&self) -> Result<(), ClientError> {
        self.job_command("cancel").await
    }

    /// Completion of the current job in whole percent.
    ///
    /// A `null` completion (no job loaded) is an error; an absent field reads as 0.
    pub async fn get_print_progress(&self) -> Result<u8, ClientError> {
        let body = self.get("api/job").await?;
        let completion = self.decode("api/job", body.truncated("progress.completion").or_missing(0))?;
        Ok(completion.clamp(0, 100) as u8)
    }

    pub async fn get_total_print_time(&self) -> Result<u64, ClientError> {
        self.job_seconds("job.estimatedPrintTime").await
    }

    pub async fn get_print_time_left(&self) -> Result<u64, ClientError> {
        self.job_seconds("progress.printTimeLeft").await
    }

    pub async fn get_elapsed_print_time(&self) -> Result<u64, ClientError> {
        self.job_seconds("progress.printTime").await
    }

    pub async fn get_file_printing(&self) -> Result<String, ClientError> {
        let body = self.get("api/job").await?;
        self.decode("api/job", body.string("job.file.name").or_missing(String::new()))
    }

    // ///// //
    // Files //
    // ///// //

    /// Selects a local file and starts printing it right away.
    pub async fn select_file(&self, file_name: &str) -> Result<(), ClientError> {
        let mut url = self.url("api/files/local/")?;
        url.path_segments_mut()
            .map_err(|()| InvalidUrlSnafu { reason: "base URL cannot have path segments" }.build())?
            .pop_if_empty()
            .push(file_name);
        self.send_post(url, &SelectFile { command: "select", print: true }, StatusCode::OK).await
    }

    // /////// //
    // G-code //
    // /////// //

    pub async fn send_gcode(&self, commands: &[String]) -> Result<(), ClientError> {
        self.post("api/printer/command", &GcodeCommands { commands }, StatusCode::NO_CONTENT).await
    }

    // /////// //
    // Helpers //
    // /////// //

    async fn job_command(&self, command: &'static str) -> Result<(), ClientError> {
        self.post("api/job", &SimpleCommand { command }, StatusCode::NO_CONTENT).await
    }

    async fn job_seconds(&self, path: &str) -> Result<u64, ClientError> {
        let body = self.get("api/job").await?;
        let seconds = self.decode("api/job", body.truncated(path).or_missing(0))?;
        Ok(seconds.max(0) as u64)
    }

    fn url(&self, endpoint: &str) -> Result<Url, ClientError> {
        self.base_url.join(endpoint).map_err(|e| InvalidUrlSnafu { reason: e.to_string() }.build())
    }

    fn decode<T>(&self, endpoint: &str, result: Result<T, DecodeError>) -> Result<T, ClientError> {
        let url = self.base_url.join(endpoint).map(String::from).unwrap_or_else(|_| endpoint.to_string());
        result.context(DecodeFailedSnafu { url })
    }

    async fn get(&self, endpoint: &str) -> Result<ResponseBody, ClientError> {
        let url = self.url(endpoint)?;
        debug!("GET {}", url);
        let response = self.http.get(url.clone()).send().await.context(UnreachableSnafu { url: url.as_str() })?;
        let text = expect_status(&url, response, StatusCode::OK).await?;
        ResponseBody::parse(&text).context(DecodeFailedSnafu { url: url.as_str() })
    }

    async fn post<T: Serialize>(&self, endpoint: &str, payload: &T, expected: StatusCode) -> Result<(), ClientError> {
        let url = self.url(endpoint)?;
        self.send_post(url, payload, expected).await
    }

    async fn send_post<T: Serialize>(&self, url: Url, payload: &T, expected: StatusCode) -> Result<(), ClientError> {
        debug!("POST {}", url);
        let response = self.http.post(url.clone()).json(payload).send().await.context(UnreachableSnafu { url: url.as_str() })?;
        expect_status(&url, response, expected).await.map(|_| ())
    }
}

impl PrinterApi for OctoprintClient {
    async fn is_printer_connected(&self) -> Result<bool, ClientError> {
        OctoprintClient::is_printer_connected(self).await
    }

    async fn get_printer_status(&self) -> Result<String, ClientError> {
        OctoprintClient::get_printer_status(self).await
    }

    async fn get_print_progress(&self) -> Result<u8, ClientError> {
        OctoprintClient::get_print_progress(self).await
    }

    async fn get_print_time_left(&self) -> Result<u64, ClientError> {
        OctoprintClient::get_print_time_left(self).await
    }

    async fn get_file_printing(&self) -> Result<String, ClientError> {
        OctoprintClient::get_file_printing(self).await
    }
}

pub fn build_base_url(host: &str, port: u16) -> Result<Url, ClientError> {
    Url::parse(&format!("http://{host}:{port}/")).map_err(|e| InvalidUrlSnafu { reason: e.to_string() }.build())
}

async fn expect_status(url: &Url, response: reqwest::Response, expected: StatusCode) -> Result<String, ClientError> {
    let status = response.status();
    let body = response.text().await.context(UnreachableSnafu { url: url.as_str() })?;

    if status == expected {
        return Ok(body);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return UnauthorizedSnafu { url: url.as_str() }.fail();
    }
    UnexpectedStatusSnafu { url: url.as_str(), status: status.as_u16(), body }.fail()
}

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
pub enum ClientError {
    #[snafu(display("Could not reach {url}"))]
    Unreachable { url: String, source: reqwest::Error },

    #[snafu(display("Error: {status} - {body} ({url})"))]
    UnexpectedStatus { url: String, status: u16, body: String },

    #[snafu(display("API key was rejected by {url}"))]
    Unauthorized { url: String },

    #[snafu(display("Could not decode response from {url}"))]
    DecodeFailed { url: String, source: DecodeError },

    #[snafu(display("No printer status in response from {url}"))]
    StatusUnavailable { url: String },

    #[snafu(display("Invalid URL: {reason}"))]
    InvalidUrl { reason: String },

    #[snafu(display("API key is not a valid header value"))]
    InvalidApiKey { source: reqwest::header::InvalidHeaderValue },

    #[snafu(display("Could not build HTTP client"))]
    BuildClient { source: reqwest::Error },
}

impl ClientError {
    /// Transport failures and unexpected status codes both mean the controller
    /// could not serve the request.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ClientError::Unreachable { .. } | ClientError::UnexpectedStatus { .. })
    }
}
