use std::sync::Arc;

use axum::{Extension, Json};
use chess_core::resolve::{
    castle_from_query_text, resolve_piece_and_square, two_squares_to_lan, Resolution, SanResolution,
};
use chess_core::{Color, GameOutcome, PieceName};
use serde_json::Value as JsonValue;

use crate::assistant::{self, OptionItem, WebhookRequest};
use crate::engine::MoveSource;
use crate::db::SessionStore;
use crate::error::AppError;
use crate::mediator::Mediator;

pub const WELCOME: &str = "Howdy! Which color would you like to choose?";
pub const ILLEGAL: &str = "The move is not legal, please try once again. Just an FYI, you can say Show Board to see the current position on the board.";
pub const ILLEGAL_CASTLE: &str = "The move you are trying to play is not legal, please try once again. Just an FYI, you can say Show Board to see the current position on the board.";
pub const AMBIGUOUS: &str = "The move is ambiguous, please specify the piece or square more clearly.";
pub const INVALID: &str = "The move is not valid, please try once again.";
pub const REPROMPT: &str = "Sorry, I did not get that. Could you please say the move again?";
pub const RESIGN: &str = "GG! Thanks for playing.";
pub const RESULT_WIN: &str = "Congratulations! You have won the game. Thanks for playing.";
pub const RESULT_LOSE: &str = "Oops, you were checkmated. Thanks for playing.";
pub const ENGINE_UNAVAILABLE: &str = "Sorry, I am unable to think of a move right now. Please try again in a moment.";

/// Spoken comment for a finished game, `None` while it goes on.
pub fn result_comment(outcome: GameOutcome) -> Option<String> {
    match outcome {
        GameOutcome::Ongoing => None,
        GameOutcome::Win => Some(RESULT_WIN.to_string()),
        GameOutcome::Loss => Some(RESULT_LOSE.to_string()),
        GameOutcome::Draw(reason) => Some(format!(
            "The game has been drawn due to {reason}. Thanks for playing."
        )),
    }
}

fn color_options() -> [OptionItem; 3] {
    [
        OptionItem::new("white", "I like white!", "White"),
        OptionItem::new("black", "I'll choose black.", "Black"),
        OptionItem::new("random", "Choose randomly", "Anything works!"),
    ]
}

type Shared<E, S> = Arc<Mediator<E, S>>;

/// POST /webhook
/// Dialogflow fulfillment: dispatch on the intent action.
pub async fn webhook<E: MoveSource, S: SessionStore>(
    Extension(mediator): Extension<Shared<E, S>>,
    Json(req): Json<WebhookRequest>,
) -> Result<Json<JsonValue>, AppError> {
    let session_id = req.session_id();

    let res = match req.action() {
        Some("welcome") => match req.param_str("color") {
            Some(color) => start_game(&mediator, session_id, color).await?,
            None => assistant::with_options(WELCOME, &color_options()),
        },
        Some("choose_color") => {
            let color = req
                .chosen_option()
                .ok_or_else(|| AppError::BadRequest("No option chosen".to_string()))?;
            start_game(&mediator, session_id, color).await?
        }
        Some("two_squares") => two_squares(&mediator, session_id, &req).await?,
        Some("castle") => castle(&mediator, session_id, req.query_text()).await?,
        Some("piece_and_square") => piece_and_square(&mediator, session_id, &req).await?,
        Some("resign") => {
            mediator.end_game(session_id).await?;
            assistant::closing(RESIGN)
        }
        other => {
            let action = other.unwrap_or_default();
            tracing::warn!(session_id, action, "Bad request: unknown intent action");
            return Err(AppError::BadRequest(format!("Unknown intent action: {action}")));
        }
    };

    Ok(Json(res))
}

async fn start_game<E: MoveSource, S: SessionStore>(
    mediator: &Mediator<E, S>,
    session_id: &str,
    requested: &str,
) -> Result<JsonValue, AppError> {
    let color = match requested.to_lowercase().as_str() {
        "white" => Color::White,
        "black" => Color::Black,
        _ if rand::random::<bool>() => Color::White,
        _ => Color::Black,
    };
    mediator.start_game(session_id, color).await?;

    let name = if color == Color::White { "white" } else { "black" };
    let mut output = format!("Okay! You are playing with the {name} pieces.");

    if color == Color::White {
        output.push_str(" Your turn.");
    } else {
        match engine_speech(mediator, session_id).await? {
            Some(speech) => output.push_str(&format!(" My move is {speech}.")),
            None => {
                mediator.end_game(session_id).await?;
                return Ok(assistant::closing(ENGINE_UNAVAILABLE));
            }
        }
    }

    Ok(assistant::simple(&output))
}

/// Engine move as speech; `None` when the engine could not produce one.
async fn engine_speech<E: MoveSource, S: SessionStore>(
    mediator: &Mediator<E, S>,
    session_id: &str,
) -> Result<Option<String>, AppError> {
    match mediator.play_engine_move_and_speak(session_id).await {
        Ok(speech) => Ok(Some(speech)),
        Err(AppError::EngineUnavailable(e)) => {
            tracing::warn!(session_id, "Engine move failed: {e}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// End the game if it is over and return the closing comment.
async fn finish_if_over<E: MoveSource, S: SessionStore>(
    mediator: &Mediator<E, S>,
    session_id: &str,
) -> Result<Option<String>, AppError> {
    let Some(comment) = result_comment(mediator.outcome(session_id).await?) else {
        return Ok(None);
    };
    mediator.end_game(session_id).await?;
    Ok(Some(comment))
}

/// The engine owes a move when an earlier reply failed. Play it before
/// taking the player's next move.
async fn catch_up<E: MoveSource, S: SessionStore>(
    mediator: &Mediator<E, S>,
    session_id: &str,
) -> Result<Option<JsonValue>, AppError> {
    let user = mediator.user(session_id).await?;
    if user.game.turn() == user.color {
        return Ok(None);
    }

    let Some(speech) = engine_speech(mediator, session_id).await? else {
        return Ok(Some(assistant::simple(ENGINE_UNAVAILABLE)));
    };
    if let Some(comment) = finish_if_over(mediator, session_id).await? {
        return Ok(Some(assistant::closing(&format!("{speech}. {comment}"))));
    }
    Ok(Some(assistant::simple(&format!("My move is {speech}. Your turn."))))
}

/// Play the player's resolved move, then the engine's reply.
async fn play_and_reply<E: MoveSource, S: SessionStore>(
    mediator: &Mediator<E, S>,
    session_id: &str,
    lan: &str,
    illegal: &str,
) -> Result<JsonValue, AppError> {
    if !mediator.play_lan(session_id, lan).await? {
        return Ok(assistant::simple(illegal));
    }
    if let Some(comment) = finish_if_over(mediator, session_id).await? {
        return Ok(assistant::closing(&comment));
    }

    let Some(speech) = engine_speech(mediator, session_id).await? else {
        return Ok(assistant::simple(ENGINE_UNAVAILABLE));
    };
    if let Some(comment) = finish_if_over(mediator, session_id).await? {
        return Ok(assistant::closing(&format!("{speech}. {comment}")));
    }
    Ok(assistant::simple(&speech))
}

fn parse_piece(name: Option<&str>) -> Option<PieceName> {
    name.and_then(|n| n.parse().ok())
}

async fn two_squares<E: MoveSource, S: SessionStore>(
    mediator: &Mediator<E, S>,
    session_id: &str,
    req: &WebhookRequest,
) -> Result<JsonValue, AppError> {
    if let Some(res) = catch_up(mediator, session_id).await? {
        return Ok(res);
    }

    let squares: Vec<String> = req.param_list("squares").iter().map(|s| s.to_lowercase()).collect();
    let [from, to] = squares.as_slice() else {
        return Ok(assistant::simple(REPROMPT));
    };
    let piece = parse_piece(req.param_str("piece"));

    let user = mediator.user(session_id).await?;
    match two_squares_to_lan(&user.game, from, to, piece) {
        Resolution::Legal(lan) => play_and_reply(mediator, session_id, &lan, ILLEGAL).await,
        Resolution::Illegal => Ok(assistant::simple(ILLEGAL)),
    }
}

async fn castle<E: MoveSource, S: SessionStore>(
    mediator: &Mediator<E, S>,
    session_id: &str,
    query_text: &str,
) -> Result<JsonValue, AppError> {
    if let Some(res) = catch_up(mediator, session_id).await? {
        return Ok(res);
    }

    let user = mediator.user(session_id).await?;
    match castle_from_query_text(&user.game, query_text) {
        Resolution::Legal(lan) => play_and_reply(mediator, session_id, &lan, ILLEGAL_CASTLE).await,
        Resolution::Illegal => Ok(assistant::simple(ILLEGAL_CASTLE)),
    }
}

async fn piece_and_square<E: MoveSource, S: SessionStore>(
    mediator: &Mediator<E, S>,
    session_id: &str,
    req: &WebhookRequest,
) -> Result<JsonValue, AppError> {
    if let Some(res) = catch_up(mediator, session_id).await? {
        return Ok(res);
    }

    let Some(square) = req.param_str("square").map(str::to_lowercase) else {
        return Ok(assistant::simple(REPROMPT));
    };
    let mover = match req.param_str("pawn") {
        Some(_) => Some(PieceName::Pawn),
        None => parse_piece(req.param_str("piece")),
    };
    let promotion = parse_piece(req.param_str("promotion"));

    let user = mediator.user(session_id).await?;
    let Ok(resolution) = resolve_piece_and_square(&user.game, mover, &square, promotion) else {
        return Ok(assistant::simple(REPROMPT));
    };

    match resolution {
        SanResolution::Legal(lan) => play_and_reply(mediator, session_id, &lan, ILLEGAL).await,
        SanResolution::Illegal => Ok(assistant::simple(ILLEGAL)),
        SanResolution::Ambiguous => Ok(assistant::simple(AMBIGUOUS)),
        SanResolution::Invalid => Ok(assistant::simple(INVALID)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::DrawReason;

    #[test]
    fn test_result_comment() {
        assert_eq!(result_comment(GameOutcome::Ongoing), None);
        assert_eq!(result_comment(GameOutcome::Win).as_deref(), Some(RESULT_WIN));
        assert_eq!(result_comment(GameOutcome::Loss).as_deref(), Some(RESULT_LOSE));
        assert_eq!(
            result_comment(GameOutcome::Draw(DrawReason::InsufficientMaterial)).as_deref(),
            Some("The game has been drawn due to insufficient material. Thanks for playing.")
        );
    }

    #[test]
    fn test_color_options_keys() {
        let keys: Vec<String> = color_options().iter().map(|o| o.option_info.key.clone()).collect();
        assert_eq!(keys, vec!["white", "black", "random"]);
    }
}
