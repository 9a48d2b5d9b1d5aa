use super::Arena;
use super::Limiter;
use super::MoveBody;
use super::QuickStartBody;
use super::LeaveBody;
use super::Reaper;
use super::StateQuery;
use super::bridge;
use crate::board::Symbol;
use crate::config::Config;
use crate::config::origin_match;
use crate::error::ApiError;
use crate::operator;
use crate::operator::OperatorBus;
use crate::search::Searcher;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::middleware::Logger;
use actix_web::web;
use serde_json::Value;
use serde_json::json;
use std::sync::Arc;

pub struct Server;

impl Server {
    pub async fn run(config: Config) -> Result<(), std::io::Error> {
        let opponent = Arc::new(Searcher::new(
            config.ai_deadline,
            config.ai_depth,
            config.cache_ceiling,
        ));
        let arena = web::Data::new(Arena::new(config.clone(), opponent));
        let bus = web::Data::new(OperatorBus::new(
            config.square_key.clone(),
            config.outbox_capacity,
        ));
        let limiter = web::Data::new(Limiter::new(config.rate_limit, config.rate_window));
        let _reaper = Reaper::spawn(arena.clone().into_inner());
        let origins = config.origins.clone();
        log::info!("starting gomoku server on port {}", config.port);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(Self::cors(&origins))
                .app_data(arena.clone())
                .app_data(bus.clone())
                .app_data(limiter.clone())
                .app_data(web::JsonConfig::default().error_handler(|err, _| {
                    ApiError::BadRequest(err.to_string()).into()
                }))
                .app_data(web::QueryConfig::default().error_handler(|err, _| {
                    ApiError::BadRequest(err.to_string()).into()
                }))
                .route("/api/gomoku/quick-start", web::post().to(quick_start))
                .route("/api/gomoku/game/{game_id}/move", web::post().to(make_move))
                .route("/api/gomoku/game/{game_id}/state", web::get().to(state))
                .route("/api/gomoku/game/{game_id}/reset", web::post().to(reset))
                .route("/api/gomoku/game/{game_id}", web::delete().to(leave))
                .route("/health", web::get().to(health))
                .route("/api/status", web::get().to(status))
                .route("/webhooks/square", web::post().to(operator::ingest))
                .route("/ws/gomoku/{room_id}", web::get().to(bridge::join))
                .route("/admin", web::get().to(bridge::admin))
        })
        .workers(4)
        .bind(("0.0.0.0", config.port))?
        .run()
        .await
    }

    fn cors(origins: &[String]) -> Cors {
        let cors = Cors::default()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);
        if origins.is_empty() {
            cors.allow_any_origin()
        } else {
            let origins = origins.to_vec();
            cors.allowed_origin_fn(move |origin, _| {
                origin
                    .to_str()
                    .map(|o| origin_match(&origins, o))
                    .unwrap_or(false)
            })
        }
    }
}

/// Success envelope shared by every route.
fn ok(data: Value) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "data": data,
        "timestamp": crate::now_ms(),
    }))
}

/// Rate-limit key: the peer address, or a fixed bucket when the
/// transport hides it.
fn peer(req: &HttpRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".into())
}

fn ws_endpoint(req: &HttpRequest, room_id: &str) -> String {
    let info = req.connection_info();
    let scheme = if info.scheme() == "https" { "wss" } else { "ws" };
    format!("{}://{}/ws/gomoku/{}", scheme, info.host(), room_id)
}

/// Only the two live symbols are valid on the wire; the reserved pair
/// is not accepted from clients.
fn parse_preference(raw: Option<&str>) -> Result<Option<Symbol>, ApiError> {
    match raw {
        None => Ok(None),
        Some("X") => Ok(Some(Symbol::X)),
        Some("O") => Ok(Some(Symbol::O)),
        Some(other) => Err(ApiError::BadRequest(format!("unknown symbol: {}", other))),
    }
}

async fn quick_start(
    arena: web::Data<Arena>,
    limiter: web::Data<Limiter>,
    body: Option<web::Json<QuickStartBody>>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    limiter.check(&peer(&req))?;
    let body = body.map(|b| b.into_inner()).unwrap_or_default();
    let preference = parse_preference(body.player_symbol.as_deref())?;
    let quick = arena.into_inner().quick_start(preference).await?;
    Ok(ok(json!({
        "gameId": quick.game_id,
        "roomId": quick.room_id,
        "playerId": quick.player_id,
        "playerSymbol": quick.player_symbol,
        "aiSymbol": quick.ai_symbol,
        "wsEndpoint": ws_endpoint(&req, &quick.room_id),
        "gameState": quick.state,
    })))
}

async fn make_move(
    arena: web::Data<Arena>,
    limiter: web::Data<Limiter>,
    path: web::Path<String>,
    body: web::Json<MoveBody>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    limiter.check(&peer(&req))?;
    let game_id = path.into_inner();
    let n = crate::SIZE as i32;
    if !(0..n).contains(&body.row) || !(0..n).contains(&body.col) {
        return Err(ApiError::BadRequest(format!(
            "row and col must be within 0..{}",
            crate::SIZE
        )));
    }
    let reply = arena
        .into_inner()
        .make_move(&game_id, body.row, body.col, &body.player_id)
        .await?;
    Ok(ok(json!({ "move": reply.mv, "gameState": reply.state })))
}

async fn state(
    arena: web::Data<Arena>,
    path: web::Path<String>,
    query: web::Query<StateQuery>,
) -> Result<HttpResponse, ApiError> {
    let snapshot = arena
        .state(&path.into_inner(), query.player_id.as_deref())
        .await?;
    Ok(ok(json!(snapshot)))
}

async fn reset(
    arena: web::Data<Arena>,
    limiter: web::Data<Limiter>,
    path: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    limiter.check(&peer(&req))?;
    let snapshot = arena.into_inner().reset(&path.into_inner()).await?;
    Ok(ok(json!(snapshot)))
}

async fn leave(
    arena: web::Data<Arena>,
    path: web::Path<String>,
    body: web::Json<LeaveBody>,
) -> Result<HttpResponse, ApiError> {
    arena.leave(&path.into_inner(), &body.player_id).await?;
    Ok(ok(json!({ "status": "left" })))
}

async fn health() -> HttpResponse {
    ok(json!({ "status": "healthy" }))
}

async fn status(arena: web::Data<Arena>, bus: web::Data<OperatorBus>) -> HttpResponse {
    let mut metrics = arena.status().await;
    metrics["operatorSockets"] = json!(bus.count().await);
    ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Searcher;
    use actix_web::test;

    fn fixtures() -> (web::Data<Arena>, web::Data<Limiter>, web::Data<OperatorBus>) {
        let mut config = Config::load();
        config.pacing = std::time::Duration::from_millis(5);
        config.ai_deadline = std::time::Duration::from_millis(100);
        let opponent = Arc::new(Searcher::new(config.ai_deadline, 2, 1024));
        let limiter = web::Data::new(Limiter::new(config.rate_limit, config.rate_window));
        let bus = web::Data::new(OperatorBus::new(None, config.outbox_capacity));
        let arena = web::Data::new(Arena::new(config, opponent));
        (arena, limiter, bus)
    }

    macro_rules! app {
        ($arena:expr, $limiter:expr, $bus:expr) => {
            test::init_service(
                App::new()
                    .app_data($arena.clone())
                    .app_data($limiter.clone())
                    .app_data($bus.clone())
                    .app_data(web::JsonConfig::default().error_handler(|err, _| {
                        ApiError::BadRequest(err.to_string()).into()
                    }))
                    .route("/api/gomoku/quick-start", web::post().to(quick_start))
                    .route("/api/gomoku/game/{game_id}/move", web::post().to(make_move))
                    .route("/api/gomoku/game/{game_id}/state", web::get().to(state))
                    .route("/health", web::get().to(health))
                    .route("/api/status", web::get().to(status))
                    .route("/webhooks/square", web::post().to(crate::operator::ingest)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn quick_start_then_move_over_http() {
        let (arena, limiter, bus) = fixtures();
        let app = app!(arena, limiter, bus);

        let req = test::TestRequest::post()
            .uri("/api/gomoku/quick-start")
            .set_json(json!({ "playerSymbol": "X" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["playerSymbol"], "X");
        assert_eq!(body["data"]["aiSymbol"], "O");
        assert_eq!(body["data"]["gameState"]["currentPlayer"], "X");
        let endpoint = body["data"]["wsEndpoint"].as_str().expect("endpoint");
        let room_id = body["data"]["roomId"].as_str().expect("room id");
        assert!(endpoint.starts_with("ws://"));
        assert!(endpoint.ends_with(&format!("/ws/gomoku/{}", room_id)));
        assert!(body["data"]["gameState"]["board"]
            .as_array()
            .expect("rows")
            .iter()
            .all(|row| row.as_array().expect("cells").iter().all(Value::is_null)));

        let game_id = body["data"]["gameId"].as_str().expect("game id").to_string();
        let player_id = body["data"]["playerId"].as_str().expect("player id").to_string();
        let req = test::TestRequest::post()
            .uri(&format!("/api/gomoku/game/{}/move", game_id))
            .set_json(json!({ "row": 7, "col": 7, "playerId": player_id }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["move"]["number"], 1);

        let req = test::TestRequest::get()
            .uri(&format!("/api/gomoku/game/{}/state?playerId={}", game_id, player_id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["gameId"], game_id.as_str());
    }

    #[actix_web::test]
    async fn out_of_range_coordinates_are_bad_requests() {
        let (arena, limiter, bus) = fixtures();
        let app = app!(arena, limiter, bus);
        let quick = test::TestRequest::post()
            .uri("/api/gomoku/quick-start")
            .set_json(json!({}))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, quick).await;
        let game_id = created["data"]["gameId"].as_str().expect("game id");
        let player_id = created["data"]["playerId"].as_str().expect("player id");

        let req = test::TestRequest::post()
            .uri(&format!("/api/gomoku/game/{}/move", game_id))
            .set_json(json!({ "row": 7, "col": 15, "playerId": player_id }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "bad-request");

        // no state change happened
        let req = test::TestRequest::get()
            .uri(&format!("/api/gomoku/game/{}/state", game_id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["data"]["moves"].as_array().expect("moves").is_empty());
    }

    #[actix_web::test]
    async fn unknown_symbols_and_games_map_to_their_codes() {
        let (arena, limiter, bus) = fixtures();
        let app = app!(arena, limiter, bus);
        let req = test::TestRequest::post()
            .uri("/api/gomoku/quick-start")
            .set_json(json!({ "playerSymbol": "Z" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400);

        let req = test::TestRequest::post()
            .uri("/api/gomoku/game/g-missing/move")
            .set_json(json!({ "row": 1, "col": 1, "playerId": "p-missing" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 404);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "not-found");
    }

    #[actix_web::test]
    async fn test_webhooks_skip_the_signature_and_reach_operators() {
        let (arena, limiter, bus) = fixtures();
        let app = app!(arena, limiter, bus);
        let (_, outbox) = bus.attach().await;
        let req = test::TestRequest::post()
            .uri("/webhooks/square")
            .set_json(json!({ "type": "test", "data": { "object": { "note": "hi" } } }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 200);
        let greeting = outbox.next().await.expect("connected");
        assert!(greeting.contains("\"connected\""));
        let fanned = outbox.next().await.expect("test-event");
        assert!(fanned.contains("\"test-event\""));
    }

    #[actix_web::test]
    async fn unsigned_order_webhooks_are_forbidden() {
        let (arena, limiter, bus) = fixtures();
        let app = app!(arena, limiter, bus);
        let req = test::TestRequest::post()
            .uri("/webhooks/square")
            .set_json(json!({ "type": "order.created", "data": {} }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 403);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "forbidden");
    }

    #[actix_web::test]
    async fn health_and_status_answer() {
        let (arena, limiter, bus) = fixtures();
        let app = app!(arena, limiter, bus);
        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert!(resp.status().is_success());
        let body: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/status").to_request(),
        )
        .await;
        assert!(body["data"]["rooms"].is_u64());
        assert!(body["data"]["operatorSockets"].is_u64());
    }
}
