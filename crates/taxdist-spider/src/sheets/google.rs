use super::{ServiceAccount, SheetStore};
use crate::http::HttpClient;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, trace};
use url::Url;

/// Base of the Sheets v4 REST API.
pub const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// One spreadsheet, opened with a service account's access token.
pub struct GoogleSheets {
    client: HttpClient,
    token: String,
    spreadsheet_id: String,
    api: String,
}

// de
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Spreadsheet {
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
struct Sheet {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

// client
// ----------------------------------------------------------------------------

impl GoogleSheets {
    /// Authenticate as `account`; the spreadsheet itself is first reached by
    /// [`GoogleSheets::tabs`] or [`GoogleSheets::select`].
    pub async fn open(
        client: HttpClient,
        account: &ServiceAccount,
        spreadsheet_id: &str,
    ) -> Result<Self> {
        let token = account.access_token(&client).await?;
        debug!("authenticated as {} for {spreadsheet_id}", account.client_email);
        Ok(Self::with_token(client, token.access_token, spreadsheet_id))
    }

    /// Use an already issued bearer token.
    pub fn with_token(
        client: HttpClient,
        token: impl Into<String>,
        spreadsheet_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            token: token.into(),
            spreadsheet_id: spreadsheet_id.into(),
            api: SHEETS_API.to_string(),
        }
    }

    /// Send requests somewhere other than Google, e.g. a local emulator.
    pub fn with_api(mut self, api: impl Into<String>) -> Self {
        self.api = api.into().trim_end_matches('/').to_string();
        self
    }

    /// Titles of every tab in the spreadsheet.
    pub async fn tabs(&self) -> Result<Vec<String>> {
        let mut url = self.spreadsheet_url(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        let response = self.client.get(url).bearer_auth(&self.token).send().await?;
        let spreadsheet: Spreadsheet = checked(response).await?.json().await?;

        Ok(spreadsheet
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect())
    }

    /// Fail unless the spreadsheet has a tab named `tab`.
    pub async fn select(&self, tab: &str) -> Result<()> {
        let tabs = self.tabs().await?;
        debug!("spreadsheet {} tabs: {tabs:?}", self.spreadsheet_id);
        find_tab(&tabs, tab).map_err(|err| {
            error!("spreadsheet {} has no tab {tab}", self.spreadsheet_id);
            err
        })
    }

    fn spreadsheet_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(&self.spreadsheet_id)
            .extend(segments);
        Ok(url)
    }

    /// `.../{id}/values/{range}{suffix}`
    pub(crate) fn values_url(&self, range: &str, suffix: &str) -> Result<Url> {
        self.spreadsheet_url(&["values", format!("{range}{suffix}").as_str()])
    }
}

fn find_tab(tabs: &[String], tab: &str) -> Result<()> {
    if tabs.iter().any(|title| title == tab) {
        trace!("tab {tab} selected");
        Ok(())
    } else {
        Err(Error::MissingTab(tab.to_string()))
    }
}

/// A1 notation for an entire tab; names are quoted so spaces and digits
/// are never read as cell references.
pub(crate) fn tab_range(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

async fn checked(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Sheets { status, body })
}

#[async_trait]
impl SheetStore for GoogleSheets {
    async fn clear(&self, tab: &str) -> Result<()> {
        let url = self.values_url(&tab_range(tab), ":clear")?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&json!({}))
            .send()
            .await?;
        checked(response).await?;
        Ok(())
    }

    async fn write(&self, tab: &str, rows: &[Vec<Value>]) -> Result<()> {
        let range = format!("{}!A1", tab_range(tab));
        let mut url = self.values_url(&range, "")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");

        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });
        let response = self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        checked(response).await?;
        Ok(())
    }

    async fn read(&self, tab: &str) -> Result<Vec<Vec<Value>>> {
        let mut url = self.values_url(&tab_range(tab), "")?;
        url.query_pairs_mut()
            .append_pair("majorDimension", "ROWS")
            .append_pair("valueRenderOption", "UNFORMATTED_VALUE");

        let response = self.client.get(url).bearer_auth(&self.token).send().await?;
        let range: ValueRange = checked(response).await?.json().await?;
        Ok(range.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheets() -> GoogleSheets {
        GoogleSheets::with_token(HttpClient::new(), "token", "1AbC-d_E")
    }

    #[test]
    fn selecting_a_tab_needs_an_exact_title() {
        let tabs = vec!["Raw".to_string(), "Summary".to_string()];
        assert!(find_tab(&tabs, "Raw").is_ok());
        assert!(matches!(find_tab(&tabs, "raw"), Err(Error::MissingTab(tab)) if tab == "raw"));
        assert!(find_tab(&[], "Raw").is_err());
    }

    #[test]
    fn tab_names_are_quoted() {
        assert_eq!(tab_range("Raw"), "'Raw'");
        assert_eq!(tab_range("Moab's 2024"), "'Moab''s 2024'");
    }

    #[test]
    fn values_urls() {
        let url = sheets().values_url(&tab_range("Raw"), ":clear").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/1AbC-d_E/values/'Raw':clear"
        );

        let url = sheets().values_url(&tab_range("Raw data"), "").unwrap();
        assert!(url.as_str().ends_with("/values/'Raw%20data'"));
    }

    #[test]
    fn api_base_can_be_replaced() {
        let url = sheets()
            .with_api("http://localhost:9000/v4/spreadsheets/")
            .values_url("'Raw'", "")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/v4/spreadsheets/1AbC-d_E/values/'Raw'"
        );
    }
}
