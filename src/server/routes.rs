use crate::error::LookupError;
use crate::server::api::{self, ApiError};
use crate::server::AppState;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    /// Set for file downloads.
    pub attachment: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    fn json(body: String) -> Self {
        Self {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            attachment: None,
            body: body.into_bytes(),
        }
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn to_http_bytes(&self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
        );
        if let Some(file_name) = &self.attachment {
            head.push_str(&content_disposition(file_name));
        }
        head.push_str("Connection: close\r\n\r\n");
        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// ASCII fallback plus RFC 5987 UTF-8 name, so Persian city names survive.
fn content_disposition(file_name: &str) -> String {
    let ascii: String = file_name
        .chars()
        .map(|c| if c.is_ascii() && c != '"' { c } else { '_' })
        .collect();
    let encoded: String = url::form_urlencoded::byte_serialize(file_name.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    format!("Content-Disposition: attachment; filename=\"{ascii}\"; filename*=UTF-8''{encoded}\r\n")
}

pub fn route_request(state: &mut AppState, method: &str, path: &str) -> HttpResponse {
    let route = path.split('?').next().unwrap_or(path);
    match (method, route) {
        ("GET", "/") => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "text/html; charset=utf-8",
            attachment: None,
            body: index_html().into_bytes(),
        },
        ("GET", "/api/health") => json_or_error(api::health_payload()),
        ("GET", "/api/sheets") => json_or_error(api::sheets_payload(state)),
        ("GET", "/api/provinces") => json_or_error(api::provinces_payload(state)),
        ("GET", "/api/cities") => json_or_error(api::cities_payload(state, path)),
        ("GET", "/api/details") => json_or_error(api::details_payload(state, path)),
        ("GET", "/api/dump") => json_or_error(api::dump_payload(state, path)),
        ("GET", "/api/state") => json_or_error(api::state_payload(state)),
        ("GET", "/api/export") => match api::export_payload(state, path) {
            Ok(export) => HttpResponse {
                status_code: 200,
                status_text: "OK",
                content_type: export.content_type,
                attachment: Some(export.file_name),
                body: export.bytes,
            },
            Err(err) => api_error_response(err),
        },
        _ => error_response(404, "Not Found", "not_found", "Route not found", None),
    }
}

fn json_or_error(result: Result<String, ApiError>) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse::json(payload),
        Err(err) => api_error_response(err),
    }
}

fn api_error_response(err: ApiError) -> HttpResponse {
    match err {
        ApiError::MissingParam(name) => error_response(
            400,
            "Bad Request",
            "missing_parameter",
            &format!("missing query parameter '{name}'"),
            None,
        ),
        ApiError::Serialize(err) => error_response(
            500,
            "Internal Server Error",
            "serialization_failed",
            &err.to_string(),
            None,
        ),
        ApiError::Lookup(err) => lookup_error_response(&err),
    }
}

fn lookup_error_response(err: &LookupError) -> HttpResponse {
    let (status_code, status_text) = match err {
        LookupError::SourceMissing { .. }
        | LookupError::SourceUnreadable { .. }
        | LookupError::Export(_) => (500, "Internal Server Error"),
        LookupError::NoProvincesDerived { .. }
        | LookupError::NoCitiesDerived { .. }
        | LookupError::NoDetailsFound { .. } => (404, "Not Found"),
        LookupError::UnknownSheet(_)
        | LookupError::UnknownProvince(_)
        | LookupError::UnknownCity(_)
        | LookupError::NoProvinceSelected
        | LookupError::NoCitySelected => (400, "Bad Request"),
    };
    let hint = match err {
        LookupError::NoCitiesDerived { .. } => Some("/api/dump?sheet=city"),
        LookupError::NoProvincesDerived { .. } => Some("/api/dump?sheet=province"),
        LookupError::NoDetailsFound { .. } => Some("/api/dump?sheet=detail"),
        _ => None,
    };
    error_response(status_code, status_text, err.kind(), &err.to_string(), hint)
}

fn error_response(
    status_code: u16,
    status_text: &'static str,
    kind: &str,
    message: &str,
    dump: Option<&str>,
) -> HttpResponse {
    let mut payload = serde_json::json!({
        "status": "error",
        "kind": kind,
        "message": message,
    });
    if let Some(dump) = dump {
        payload["dump"] = serde_json::Value::String(dump.to_string());
    }
    let fallback = "{\n  \"status\": \"error\",\n  \"message\": \"Unknown error\"\n}".to_string();
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        attachment: None,
        body: serde_json::to_string_pretty(&payload)
            .unwrap_or(fallback)
            .into_bytes(),
    }
}

fn index_html() -> String {
    r#"<!doctype html>
<html lang="fa" dir="rtl">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Wall Details Explorer</title>
  <style>
    body { font-family: Tahoma, Arial, sans-serif; max-width: 1100px; margin: 24px auto; padding: 0 12px; }
    .card { border: 1px solid #ddd; border-radius: 8px; padding: 14px; margin: 14px 0; }
    label { display:block; margin: 8px 0 4px; font-weight: 600; }
    select { width: 100%; padding: 8px; box-sizing: border-box; }
    button { margin-top: 12px; padding: 8px 14px; }
    table { border-collapse: collapse; width: 100%; direction: ltr; }
    td, th { border: 1px solid #ccc; padding: 4px 6px; font-size: 0.9rem; }
    #message { color: #a33; white-space: pre-wrap; }
  </style>
</head>
<body>
  <h1>Wall Details Explorer</h1>
  <p>Select a province, then a city, then show the matching wall details.</p>

  <div class="card">
    <label for="province">Province</label>
    <select id="province"></select>
    <label for="city">City</label>
    <select id="city"></select>
    <button id="details-btn">Show wall details</button>
    <a id="download" style="display:none;margin-inline-start:12px">Download (Excel)</a>
  </div>

  <p id="message"></p>
  <div id="result"></div>

  <script>
    const provinceEl = document.getElementById('province');
    const cityEl = document.getElementById('city');
    const messageEl = document.getElementById('message');
    const resultEl = document.getElementById('result');
    const downloadEl = document.getElementById('download');

    async function getJson(path) {
      const response = await fetch(path);
      const body = await response.json();
      if (!response.ok) { throw body; }
      return body;
    }

    function showError(err) {
      messageEl.textContent = (err && err.message) ? err.message : String(err);
      if (err && err.dump) { messageEl.textContent += '\n' + err.dump; }
    }

    async function loadProvinces() {
      try {
        const data = await getJson('/api/provinces');
        provinceEl.innerHTML = '';
        for (const p of data.provinces) {
          const opt = document.createElement('option');
          opt.value = p.code;
          opt.textContent = p.label;
          provinceEl.appendChild(opt);
        }
        await loadCities();
      } catch (err) { showError(err); }
    }

    async function loadCities() {
      messageEl.textContent = '';
      resultEl.innerHTML = '';
      downloadEl.style.display = 'none';
      cityEl.innerHTML = '';
      try {
        const data = await getJson('/api/cities?province=' + encodeURIComponent(provinceEl.value));
        for (const c of data.cities) {
          const opt = document.createElement('option');
          opt.value = c.code || c.name;
          opt.textContent = c.name;
          cityEl.appendChild(opt);
        }
      } catch (err) { showError(err); }
    }

    async function loadDetails() {
      messageEl.textContent = '';
      resultEl.innerHTML = '';
      downloadEl.style.display = 'none';
      const query = 'province=' + encodeURIComponent(provinceEl.value) + '&city=' + encodeURIComponent(cityEl.value);
      try {
        const data = await getJson('/api/details?' + query);
        const table = document.createElement('table');
        const head = table.insertRow();
        for (const col of data.table.columns) {
          const th = document.createElement('th');
          th.textContent = col;
          head.appendChild(th);
        }
        for (const row of data.table.rows) {
          const tr = table.insertRow();
          for (const cell of row.cells) { tr.insertCell().textContent = cell; }
        }
        messageEl.textContent = data.count + ' row(s) found.';
        resultEl.appendChild(table);
        downloadEl.href = '/api/export?' + query;
        downloadEl.style.display = 'inline';
      } catch (err) { showError(err); }
    }

    provinceEl.addEventListener('change', loadCities);
    document.getElementById('details-btn').addEventListener('click', loadDetails);
    loadProvinces();
  </script>
</body>
</html>
"#
    .to_string()
}
