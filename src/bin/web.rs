//! Single binary web server: the engine's operations as a JSON REST API over an in-memory store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT; league points with
//! POINTS_WIN / POINTS_DRAW / POINTS_LOSS.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tournament_engine::{
    results_csv, standings_csv, AttemptInput, Config, Discipline, EngineError, EngineResult, ManualRank, MatchId,
    ParticipationId, PhaseId, PhaseKind, Registrant, RegistrantId, Score, Store,
};

/// Shared store. Reads take the read guard; every write is serialized by the write guard.
type AppState = Data<RwLock<Store>>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreatePhaseBody {
    name: String,
    kind: PhaseKind,
    #[serde(default)]
    discipline: Discipline,
    #[serde(default)]
    display_order: u32,
}

#[derive(Deserialize)]
struct AddRegistrantBody {
    name: String,
    #[serde(default)]
    division: Option<String>,
}

#[derive(Deserialize)]
struct GenerateBracketBody {
    registrant_ids: Vec<RegistrantId>,
    #[serde(default)]
    include_third_place: bool,
}

#[derive(Deserialize)]
struct AdvanceBody {
    winner: RegistrantId,
    #[serde(default)]
    score: Option<Score>,
}

#[derive(Deserialize)]
struct WalkoverBody {
    winner: RegistrantId,
}

#[derive(Deserialize)]
struct ScheduleBody {
    #[serde(default)]
    scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    venue: Option<String>,
}

#[derive(Deserialize)]
struct ResultBody {
    /// Omitted or null for a draw.
    #[serde(default)]
    winner: Option<RegistrantId>,
    score: Score,
}

#[derive(Deserialize)]
struct ManualRanksBody {
    entries: Vec<ManualRank>,
}

#[derive(Serialize)]
struct BracketStatus {
    complete: bool,
    champion: Option<RegistrantId>,
    third_place: Option<RegistrantId>,
}

/// Path segment: phase id (e.g. /api/phases/{id})
#[derive(Deserialize)]
struct PhasePath {
    id: PhaseId,
}

/// Path segment: match id (e.g. /api/matches/{match_id})
#[derive(Deserialize)]
struct MatchPath {
    match_id: MatchId,
}

#[derive(Deserialize)]
struct ParticipationPath {
    participation_id: ParticipationId,
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

fn error_response(e: EngineError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        EngineError::PhaseNotFound(_) | EngineError::MatchNotFound(_) | EngineError::ParticipationNotFound(_) => {
            HttpResponse::NotFound().json(body)
        }
        EngineError::AlreadyInitialized
        | EngineError::AlreadyFinalized(_)
        | EngineError::InconsistentBracketState(_)
        | EngineError::ThirdPlaceSlotFull => HttpResponse::Conflict().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn respond<T: Serialize>(result: EngineResult<T>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(e),
    }
}

fn bracket_status(store: &Store, phase_id: PhaseId) -> EngineResult<BracketStatus> {
    Ok(BracketStatus {
        complete: store.is_bracket_complete(phase_id)?,
        champion: store.get_champion(phase_id)?,
        third_place: store.get_third_place(phase_id)?,
    })
}

fn csv_response(result: Result<String, tournament_engine::ExportError>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(body),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() })),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-engine",
    })
}

/// List phases by display order.
#[get("/api/phases")]
async fn api_list_phases(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(g.phases())
}

#[post("/api/phases")]
async fn api_create_phase(state: AppState, body: Json<CreatePhaseBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let body = body.into_inner();
    let phase = g.create_phase(body.name.trim(), body.kind, body.discipline, body.display_order);
    HttpResponse::Ok().json(phase)
}

#[get("/api/phases/{id}")]
async fn api_get_phase(state: AppState, path: Path<PhasePath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    respond(g.phase(path.id))
}

/// Freeze a phase; later writes fail.
#[post("/api/phases/{id}/archive")]
async fn api_archive_phase(state: AppState, path: Path<PhasePath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    respond(g.archive_phase(path.id))
}

/// Enroll a registrant (returns it plus its participation for attempt-based phases).
#[post("/api/phases/{id}/registrants")]
async fn api_add_registrant(state: AppState, path: Path<PhasePath>, body: Json<AddRegistrantBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let body = body.into_inner();
    let mut registrant = Registrant::new(body.name.trim());
    registrant.division = body.division;
    respond(g.enroll(path.id, registrant).map(|(registrant, participation)| {
        serde_json::json!({ "registrant": registrant, "participation": participation })
    }))
}

#[post("/api/phases/{id}/bracket")]
async fn api_generate_bracket(
    state: AppState,
    path: Path<PhasePath>,
    body: Json<GenerateBracketBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    respond(g.generate_bracket(path.id, &body.registrant_ids, body.include_third_place))
}

#[get("/api/phases/{id}/bracket")]
async fn api_get_bracket(state: AppState, path: Path<PhasePath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    respond(g.get_bracket_structure(path.id))
}

/// Remove all matches so the bracket (or fixture list) can be generated again.
#[delete("/api/phases/{id}/bracket")]
async fn api_clear_bracket(state: AppState, path: Path<PhasePath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    respond(g.clear_bracket(path.id).map(|removed| serde_json::json!({ "removed": removed })))
}

#[get("/api/phases/{id}/bracket/status")]
async fn api_bracket_status(state: AppState, path: Path<PhasePath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    respond(bracket_status(&g, path.id))
}

/// Generate the round-robin fixtures of a group phase.
#[post("/api/phases/{id}/fixtures")]
async fn api_generate_fixtures(state: AppState, path: Path<PhasePath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    respond(g.generate_round_robin(path.id))
}

#[post("/api/matches/{match_id}/advance")]
async fn api_advance_winner(state: AppState, path: Path<MatchPath>, body: Json<AdvanceBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let body = body.into_inner();
    respond(g.advance_winner(path.match_id, body.winner, body.score))
}

#[post("/api/matches/{match_id}/walkover")]
async fn api_walkover(state: AppState, path: Path<MatchPath>, body: Json<WalkoverBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    respond(g.record_walkover(path.match_id, body.winner))
}

#[post("/api/matches/{match_id}/start")]
async fn api_start_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    respond(g.start_match(path.match_id))
}

#[put("/api/matches/{match_id}/schedule")]
async fn api_schedule_match(state: AppState, path: Path<MatchPath>, body: Json<ScheduleBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let body = body.into_inner();
    respond(g.schedule_match(path.match_id, body.scheduled_at, body.venue))
}

/// Record a group fixture result (winner omitted for a draw).
#[put("/api/matches/{match_id}/result")]
async fn api_record_result(state: AppState, path: Path<MatchPath>, body: Json<ResultBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let body = body.into_inner();
    respond(g.record_result(path.match_id, body.winner, body.score))
}

#[get("/api/phases/{id}/standings")]
async fn api_standings(state: AppState, path: Path<PhasePath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    respond(g.compute_standings(path.id))
}

#[get("/api/phases/{id}/standings.csv")]
async fn api_standings_csv(state: AppState, path: Path<PhasePath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let phase = match g.phase(path.id) {
        Ok(phase) => phase,
        Err(e) => return error_response(e),
    };
    let rows = tournament_engine::compute_standings(phase);
    csv_response(standings_csv(phase, &rows))
}

#[put("/api/phases/{id}/manual-ranks")]
async fn api_set_manual_ranks(state: AppState, path: Path<PhasePath>, body: Json<ManualRanksBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    respond(
        g.set_manual_ranks(path.id, &body.entries)
            .map(|updated| serde_json::json!({ "updated": updated })),
    )
}

#[delete("/api/phases/{id}/manual-ranks")]
async fn api_clear_manual_ranks(state: AppState, path: Path<PhasePath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    respond(g.clear_manual_ranks(path.id).map(|cleared| serde_json::json!({ "cleared": cleared })))
}

#[put("/api/participations/{participation_id}/attempts")]
async fn api_upsert_attempt(
    state: AppState,
    path: Path<ParticipationPath>,
    body: Json<AttemptInput>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    respond(g.upsert_attempt(path.participation_id, body.into_inner()))
}

#[get("/api/phases/{id}/results")]
async fn api_results(state: AppState, path: Path<PhasePath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    respond(g.compute_results(path.id))
}

#[get("/api/phases/{id}/results.csv")]
async fn api_results_csv(state: AppState, path: Path<PhasePath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.compute_results(path.id) {
        Ok(results) => csv_response(results_csv(&results)),
        Err(e) => error_response(e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(Config::default_log_filter()));

    let config = Config::from_env().map_err(|e| {
        log::error!("{}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let state = Data::new(RwLock::new(Store::new(config.points)));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_list_phases)
            .service(api_create_phase)
            .service(api_get_phase)
            .service(api_archive_phase)
            .service(api_add_registrant)
            .service(api_generate_bracket)
            .service(api_get_bracket)
            .service(api_clear_bracket)
            .service(api_bracket_status)
            .service(api_generate_fixtures)
            .service(api_advance_winner)
            .service(api_walkover)
            .service(api_start_match)
            .service(api_schedule_match)
            .service(api_record_result)
            .service(api_standings)
            .service(api_standings_csv)
            .service(api_set_manual_ranks)
            .service(api_clear_manual_ranks)
            .service(api_upsert_attempt)
            .service(api_results)
            .service(api_results_csv)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
