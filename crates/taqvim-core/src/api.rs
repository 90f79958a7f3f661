use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use taqvim_shared::{
  HolidayDto,
  MeetingCreate,
  MeetingDto,
  TaskCreate,
  TaskDto
};
use tracing::{
  debug,
  instrument,
  warn
};

use crate::config::ServerConfig;
use crate::day_id::DayId;

const XSRF_COOKIE: &str = "XSRF-TOKEN";
const XSRF_HEADER: &str = "X-XSRF-TOKEN";

/// The REST endpoints the calendar page
/// reads and writes. Dates crossing this
/// boundary are always Gregorian.
#[allow(async_fn_in_trait)]
pub trait CalendarApi {
  async fn tasks(
    &self
  ) -> anyhow::Result<Vec<TaskDto>>;

  async fn meetings(
    &self,
    from: NaiveDate,
    to: NaiveDate
  ) -> anyhow::Result<Vec<MeetingDto>>;

  async fn holidays(
    &self,
    start: &DayId,
    end: &DayId
  ) -> anyhow::Result<Vec<HolidayDto>>;

  async fn create_task(
    &self,
    create: &TaskCreate
  ) -> anyhow::Result<TaskDto>;

  async fn create_meeting(
    &self,
    create: &MeetingCreate
  ) -> anyhow::Result<MeetingDto>;
}

#[derive(Debug, Clone)]
pub struct HttpCalendarApi {
  client:   reqwest::Client,
  base_url: String,
  cookie:   Option<String>,
  xsrf:     Option<String>
}

impl HttpCalendarApi {
  pub fn new(
    server: &ServerConfig
  ) -> anyhow::Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(
        server.timeout_secs
      ))
      .build()
      .context(
        "failed building HTTP client for \
         calendar API"
      )?;

    let cookie = server.cookie.clone();
    let xsrf = cookie.as_deref().and_then(
      |c| cookie_value(c, XSRF_COOKIE)
    );

    debug!(
      base_url = %server.base_url,
      has_cookie = cookie.is_some(),
      has_xsrf = xsrf.is_some(),
      "built calendar API client"
    );

    Ok(Self {
      client,
      base_url: server.base_url.clone(),
      cookie,
      xsrf
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  async fn get_json<T>(
    &self,
    path: &str
  ) -> anyhow::Result<T>
  where
    T: DeserializeOwned
  {
    let url = self.url(path);
    let mut request = self
      .client
      .get(url.as_str())
      .header(
        reqwest::header::ACCEPT,
        "application/json"
      );
    if let Some(cookie) = &self.cookie {
      request = request.header(
        reqwest::header::COOKIE,
        cookie.as_str()
      );
    }

    let response =
      request.send().await.with_context(
        || format!("failed requesting {url}")
      )?;
    read_json(response, &url).await
  }

  async fn post_json<B, T>(
    &self,
    path: &str,
    body: &B
  ) -> anyhow::Result<T>
  where
    B: Serialize,
    T: DeserializeOwned
  {
    let url = self.url(path);
    let mut request = self
      .client
      .post(url.as_str())
      .header(
        reqwest::header::ACCEPT,
        "application/json"
      )
      .json(body);
    if let Some(cookie) = &self.cookie {
      request = request.header(
        reqwest::header::COOKIE,
        cookie.as_str()
      );
    }
    if let Some(token) = &self.xsrf {
      request = request
        .header(XSRF_HEADER, token.as_str());
    } else {
      warn!(
        url = %url,
        "no XSRF-TOKEN cookie configured; \
         server may reject the request"
      );
    }

    let response =
      request.send().await.with_context(
        || format!("failed requesting {url}")
      )?;
    read_json(response, &url).await
  }
}

async fn read_json<T>(
  response: reqwest::Response,
  url: &str
) -> anyhow::Result<T>
where
  T: DeserializeOwned
{
  let status = response.status();
  if !status.is_success() {
    let body =
      response.text().await.unwrap_or_default();
    warn!(
      url = %url,
      status = %status,
      "calendar API returned non-success \
       status"
    );
    let message = if body.trim().is_empty()
    {
      format!("HTTP {}", status.as_u16())
    } else {
      body.trim().to_string()
    };
    anyhow::bail!(message);
  }

  response.json::<T>().await.with_context(
    || {
      format!(
        "failed decoding JSON response \
         from {url}"
      )
    }
  )
}

impl CalendarApi for HttpCalendarApi {
  #[instrument(skip(self))]
  async fn tasks(
    &self
  ) -> anyhow::Result<Vec<TaskDto>> {
    self.get_json("/api/tasks").await
  }

  #[instrument(skip(self))]
  async fn meetings(
    &self,
    from: NaiveDate,
    to: NaiveDate
  ) -> anyhow::Result<Vec<MeetingDto>> {
    self
      .get_json(&format!(
        "/api/meetings?from={}&to={}",
        from.format("%Y-%m-%d"),
        to.format("%Y-%m-%d")
      ))
      .await
  }

  #[instrument(skip(self, start, end), fields(start = %start, end = %end))]
  async fn holidays(
    &self,
    start: &DayId,
    end: &DayId
  ) -> anyhow::Result<Vec<HolidayDto>> {
    self
      .get_json(&format!(
        "/api/calendar/holidays/range?\
         start={start}&end={end}"
      ))
      .await
  }

  #[instrument(skip(self, create), fields(date = %create.date))]
  async fn create_task(
    &self,
    create: &TaskCreate
  ) -> anyhow::Result<TaskDto> {
    self.post_json("/api/tasks", create).await
  }

  #[instrument(skip(self, create), fields(date = %create.date))]
  async fn create_meeting(
    &self,
    create: &MeetingCreate
  ) -> anyhow::Result<MeetingDto> {
    self
      .post_json("/api/meetings", create)
      .await
  }
}

/// Finds `name` in a `Cookie` header value
/// such as `SESSION=abc; XSRF-TOKEN=xyz`.
pub fn cookie_value(
  cookies: &str,
  name: &str
) -> Option<String> {
  cookies
    .split(';')
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(key, _)| key.trim() == name)
    .map(|(_, value)| value.trim().to_string())
    .filter(|value| !value.is_empty())
}
