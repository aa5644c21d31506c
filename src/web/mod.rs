use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::predictor::{ChancePrediction, MatchSnapshot, PredictionError, Predictor};

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
}

/// Build the Axum router for the predictor page and its JSON API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/options", get(options_handler))
        .route("/api/predict", post(predict_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Serve the single-file predictor page.
async fn index_handler() -> impl IntoResponse {
    Html(PREDICTOR_HTML)
}

#[derive(Serialize)]
struct OptionsResponse {
    batting_teams: Vec<String>,
    bowling_teams: Vec<String>,
    cities: Vec<String>,
}

/// GET /api/options — team and city values the loaded model can score,
/// sorted for the form selects.
async fn options_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let vocab = state.predictor.classifier().vocabulary();
    let mut batting_teams = vocab.batting_teams.clone();
    let mut bowling_teams = vocab.bowling_teams.clone();
    let mut cities = vocab.cities.clone();
    batting_teams.sort();
    bowling_teams.sort();
    cities.sort();
    Json(OptionsResponse {
        batting_teams,
        bowling_teams,
        cities,
    })
}

#[derive(Serialize)]
struct PredictResponse {
    batting_team: String,
    bowling_team: String,
    win_probability: f64,
    loss_probability: f64,
    /// Rounded display percentages: round(p * 100).
    win_pct: u32,
    loss_pct: u32,
}

impl From<ChancePrediction> for PredictResponse {
    fn from(p: ChancePrediction) -> Self {
        PredictResponse {
            win_pct: (p.win_probability * 100.0).round() as u32,
            loss_pct: (p.loss_probability * 100.0).round() as u32,
            batting_team: p.batting_team,
            bowling_team: p.bowling_team,
            win_probability: p.win_probability,
            loss_probability: p.loss_probability,
        }
    }
}

/// POST /api/predict — score one user-submitted match snapshot.
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    Json(snapshot): Json<MatchSnapshot>,
) -> Result<Json<PredictResponse>, (StatusCode, String)> {
    match state.predictor.predict(&snapshot) {
        Ok(p) => Ok(Json(p.into())),
        Err(PredictionError::NoOversBowled) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Overs completed cannot be zero!".to_string(),
        )),
        Err(PredictionError::Classifier(e)) => {
            error!("Prediction failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Prediction failed".to_string(),
            ))
        }
    }
}

/// Embedded single-file predictor page (HTML + CSS + JS)
const PREDICTOR_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>IPL Victory Predictor</title>
<style>
  :root {
    --bg: #000000;
    --card: #14141c;
    --border: #2a2d3a;
    --accent: #FF4500;
    --accent-hover: #D84315;
    --text: #ffffff;
    --muted: #8888aa;
    --warn: #ff9800;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  .hero { text-align: center; padding: 3rem 2rem 1rem; }
  .hero h1 { font-size: 2.6rem; font-weight: 700; }
  .hero p { font-size: 1.1rem; color: var(--muted); margin-top: .6rem; }
  main { max-width: 760px; margin: 0 auto; padding: 2rem; }
  h2.title { font-size: 2rem; font-weight: 700; margin-bottom: 1.2rem; }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1.5rem; }
  .grid { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; }
  @media (max-width: 600px) { .grid { grid-template-columns: 1fr; } }
  label { display: block; font-size: .85rem; color: var(--muted); margin-bottom: .3rem; }
  select, input { width: 100%; background: var(--bg); color: var(--text); border: 1px solid var(--border); border-radius: 6px; padding: .55rem .7rem; font-size: .95rem; }
  select:focus, input:focus { outline: none; border-color: var(--accent); }
  .field { margin-bottom: .4rem; }
  button { width: 100%; margin-top: 1.2rem; background: var(--accent); color: var(--text); font-size: 1.1rem; font-weight: 600; padding: .7rem; border: none; border-radius: 8px; cursor: pointer; transition: background-color .3s ease; }
  button:hover { background: var(--accent-hover); }
  #warning { display: none; margin-top: 1rem; padding: .7rem 1rem; border-radius: 6px; background: rgba(255,152,0,.12); color: var(--warn); border: 1px solid var(--warn); }
  #result { display: none; margin-top: 1.4rem; }
  #result h2 { font-size: 1.6rem; color: var(--accent); margin-bottom: .4rem; }
</style>
</head>
<body>
<div class="hero">
  <h1>Can't Tell a Yorker from a Googly? We Got Your IPL Predictions Covered</h1>
  <p>Dominate your fantasy league and win big with our winning strategies</p>
</div>

<main>
  <h2 class="title">IPL VICTORY PREDICTOR</h2>
  <div class="panel">
    <div class="grid">
      <div class="field">
        <label for="batting-team">Select the batting team</label>
        <select id="batting-team"></select>
      </div>
      <div class="field">
        <label for="bowling-team">Select the bowling team</label>
        <select id="bowling-team"></select>
      </div>
      <div class="field">
        <label for="city">Select the host city</label>
        <select id="city"></select>
      </div>
      <div class="field">
        <label for="target">Target</label>
        <input id="target" type="number" min="1" value="160">
      </div>
      <div class="field">
        <label for="score">Score</label>
        <input id="score" type="number" min="0" value="0">
      </div>
      <div class="field">
        <label for="overs">Overs completed</label>
        <input id="overs" type="number" min="0" max="20" step="0.1" value="0.0">
      </div>
      <div class="field">
        <label for="wickets">Wickets fallen</label>
        <input id="wickets" type="number" min="0" max="10" value="0">
      </div>
    </div>
    <button id="predict-btn">Predict</button>
    <div id="warning"></div>
    <div id="result">
      <h2 id="win-line"></h2>
      <h2 id="loss-line"></h2>
    </div>
  </div>
</main>

<script>
function fillSelect(el, values) {
  el.innerHTML = values.map(v => '<option>' + v + '</option>').join('');
}

async function loadOptions() {
  const r = await fetch('/api/options');
  if (!r.ok) return;
  const o = await r.json();
  fillSelect(document.getElementById('batting-team'), o.batting_teams);
  fillSelect(document.getElementById('bowling-team'), o.bowling_teams);
  fillSelect(document.getElementById('city'), o.cities);
}

function hideOutput() {
  document.getElementById('warning').style.display = 'none';
  document.getElementById('result').style.display = 'none';
}

function showWarning(text) {
  const w = document.getElementById('warning');
  w.textContent = text;
  w.style.display = 'block';
}

async function predict() {
  hideOutput();
  const snapshot = {
    batting_team: document.getElementById('batting-team').value,
    bowling_team: document.getElementById('bowling-team').value,
    city: document.getElementById('city').value,
    target: parseInt(document.getElementById('target').value, 10),
    score: parseInt(document.getElementById('score').value, 10),
    overs: parseFloat(document.getElementById('overs').value),
    wickets: parseInt(document.getElementById('wickets').value, 10)
  };
  const r = await fetch('/api/predict', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(snapshot)
  });
  if (r.status === 422) {
    showWarning(await r.text());
    return;
  }
  if (!r.ok) {
    showWarning('Prediction failed. Please try again.');
    return;
  }
  const p = await r.json();
  document.getElementById('win-line').textContent = p.batting_team + ' - ' + p.win_pct + '%';
  document.getElementById('loss-line').textContent = p.bowling_team + ' - ' + p.loss_pct + '%';
  document.getElementById('result').style.display = 'block';
}

document.getElementById('predict-btn').addEventListener('click', predict);
loadOptions();
</script>
</body>
</html>"#;
