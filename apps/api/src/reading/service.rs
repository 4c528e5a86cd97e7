//! Reading Service — validates a three-card request, restores selection order,
//! calls the narrative service once and extracts the reading text.
//!
//! Flow: validate → find_by_ids → order by selection → credential check →
//!       build prompt → LLM complete → extract text (or fallback).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::store::CardStore;
use crate::errors::AppError;
use crate::llm_client::{ChatCompletion, LlmClient, LlmError};
use crate::models::card::CardRow;
use crate::reading::prompts::{POSITIONS, READING_SYSTEM, READING_USER_TEMPLATE};

pub const CARD_COUNT: usize = 3;

/// Moderate sampling: readings should vary between requests.
pub const READING_TEMPERATURE: f64 = 0.8;

/// Returned in place of an empty completion.
pub const FALLBACK_READING: &str = "Could not generate a reading. Please try again.";

/// Request body for a reading. Ids are ordered Past, Present, Future.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingRequest {
    #[serde(default)]
    pub card_ids: Option<Vec<i32>>,
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadingResponse {
    pub cards: Vec<CardRow>,
    pub reading: String,
}

/// Runs the full reading pipeline. Validation failures never reach the store
/// or the narrative service.
pub async fn generate_reading(
    store: &dyn CardStore,
    llm: &LlmClient,
    request: &ReadingRequest,
) -> Result<ReadingResponse, AppError> {
    let (card_ids, question) = validate_request(request)?;

    let found = store.find_by_ids(card_ids).await?;
    let cards = order_by_selection(card_ids, found)?;

    if !llm.is_configured() {
        return Err(LlmError::MissingApiKey.into());
    }

    let user_message = build_user_message(question, &cards);
    let completion = llm.complete(READING_SYSTEM, &user_message).await?;
    let reading = extract_reading(&completion);

    info!(
        "Generated reading for cards {:?} ({} chars)",
        card_ids,
        reading.len()
    );

    Ok(ReadingResponse { cards, reading })
}

/// Checks, in order: exactly three ids, a non-blank question, no repeated id.
pub fn validate_request(request: &ReadingRequest) -> Result<(&[i32], &str), AppError> {
    let card_ids = match request.card_ids.as_deref() {
        Some(ids) if ids.len() == CARD_COUNT => ids,
        _ => {
            return Err(AppError::Validation(
                "You must select exactly 3 cards.".to_string(),
            ))
        }
    };

    let question = request.prompt.as_deref().unwrap_or_default();
    if question.trim().is_empty() {
        return Err(AppError::Validation(
            "Please enter your question.".to_string(),
        ));
    }

    let distinct: HashSet<i32> = card_ids.iter().copied().collect();
    if distinct.len() != card_ids.len() {
        return Err(AppError::Validation(
            "Each card can only be selected once.".to_string(),
        ));
    }

    Ok((card_ids, question))
}

/// Re-associates unordered store rows with the requested id order.
pub fn order_by_selection(card_ids: &[i32], found: Vec<CardRow>) -> Result<Vec<CardRow>, AppError> {
    let by_id: HashMap<i32, CardRow> = found.into_iter().map(|c| (c.id, c)).collect();
    card_ids
        .iter()
        .map(|id| by_id.get(id).cloned().ok_or(AppError::CardsNotFound))
        .collect()
}

/// One `Position: Card name` line per selected card.
pub fn format_cards_block(cards: &[CardRow]) -> String {
    POSITIONS
        .iter()
        .zip(cards)
        .map(|(position, card)| format!("{position}: {}", card.name))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_user_message(question: &str, cards: &[CardRow]) -> String {
    READING_USER_TEMPLATE
        .replace("{cards}", &format_cards_block(cards))
        .replace("{question}", question)
}

pub fn extract_reading(completion: &ChatCompletion) -> String {
    completion
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(FALLBACK_READING)
        .to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::store::memory::MemoryCardStore;
    use crate::llm_client::{LlmSettings, REQUEST_TIMEOUT};
    use axum::{http::StatusCode, response::IntoResponse};
    use httpmock::prelude::*;
    use std::time::Duration;
    use serde_json::json;

    const DECK: [&str; 5] = [
        "The Fool",
        "The Magician",
        "The High Priestess",
        "The Empress",
        "The Emperor",
    ];

    fn request(ids: Option<Vec<i32>>, prompt: &str) -> ReadingRequest {
        ReadingRequest {
            card_ids: ids,
            prompt: Some(prompt.to_string()),
        }
    }

    fn llm(base_url: String, api_key: Option<&str>) -> LlmClient {
        LlmClient::new(LlmSettings {
            api_key: api_key.map(str::to_string),
            model: "gpt-4o-mini".to_string(),
            base_url,
            temperature: READING_TEMPERATURE,
        })
        .unwrap()
    }

    fn completion_body(content: serde_json::Value) -> serde_json::Value {
        json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })
    }

    #[test]
    fn test_wrong_card_count_is_rejected() {
        for ids in [vec![1, 2], vec![1, 2, 3, 4], vec![]] {
            let err = validate_request(&request(Some(ids), "Will it work?")).unwrap_err();
            assert_eq!(err.to_string(), "You must select exactly 3 cards.");
        }
        let err = validate_request(&request(None, "Will it work?")).unwrap_err();
        assert_eq!(err.to_string(), "You must select exactly 3 cards.");
    }

    #[test]
    fn test_count_checked_before_question() {
        let err = validate_request(&request(Some(vec![1]), "  ")).unwrap_err();
        assert_eq!(err.to_string(), "You must select exactly 3 cards.");
    }

    #[test]
    fn test_blank_question_is_rejected() {
        let err = validate_request(&request(Some(vec![1, 2, 3]), " \n\t")).unwrap_err();
        assert_eq!(err.to_string(), "Please enter your question.");

        let missing = ReadingRequest {
            card_ids: Some(vec![1, 2, 3]),
            prompt: None,
        };
        assert!(matches!(
            validate_request(&missing),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_repeated_card_is_rejected() {
        let err = validate_request(&request(Some(vec![5, 5, 5]), "Love?")).unwrap_err();
        assert_eq!(err.to_string(), "Each card can only be selected once.");
        assert!(validate_request(&request(Some(vec![1, 2, 1]), "Love?")).is_err());
    }

    #[test]
    fn test_order_follows_selection_not_store() {
        let store = MemoryCardStore::with_cards(&DECK);
        let found: Vec<CardRow> = store.cards().into_iter().take(3).collect();

        let ordered = order_by_selection(&[3, 1, 2], found).unwrap();

        let ids: Vec<i32> = ordered.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_order_by_selection_reports_missing_card() {
        let store = MemoryCardStore::with_cards(&DECK);
        let err = order_by_selection(&[1, 2, 999], store.cards()).unwrap_err();
        assert!(matches!(err, AppError::CardsNotFound));
    }

    #[test]
    fn test_cards_block_labels_positions() {
        let store = MemoryCardStore::with_cards(&DECK);
        let cards = order_by_selection(&[3, 1, 2], store.cards()).unwrap();

        assert_eq!(
            format_cards_block(&cards),
            "Past: The High Priestess\nPresent: The Fool\nFuture: The Magician"
        );
    }

    #[test]
    fn test_user_message_carries_question_and_cards() {
        let store = MemoryCardStore::with_cards(&DECK);
        let cards = order_by_selection(&[1, 2, 3], store.cards()).unwrap();

        let message = build_user_message("Will my friends reconcile?", &cards);

        assert!(message.starts_with("QUESTION:\nWill my friends reconcile?\n"));
        assert!(message.contains("CARDS:\nPast: The Fool\nPresent: The Magician\nFuture: The High Priestess"));
    }

    #[test]
    fn test_system_prompt_demands_template() {
        for heading in ["**Past (", "**Present (", "**Future (", "**Suggestions**"] {
            assert!(READING_SYSTEM.contains(heading), "missing {heading}");
        }
        assert!(READING_SYSTEM.contains("at most 2 emoji"));
    }

    #[test]
    fn test_extract_reading_falls_back_on_blank_content() {
        for content in [json!(""), json!("   \n"), json!(null)] {
            let completion: ChatCompletion =
                serde_json::from_value(completion_body(content)).unwrap();
            assert_eq!(extract_reading(&completion), FALLBACK_READING);
        }
        let no_choices: ChatCompletion = serde_json::from_value(json!({"choices": []})).unwrap();
        assert_eq!(extract_reading(&no_choices), FALLBACK_READING);
    }

    #[test]
    fn test_extract_reading_trims_content() {
        let completion: ChatCompletion =
            serde_json::from_value(completion_body(json!("\n**Past (The Fool)**\nText.\n"))).unwrap();
        assert_eq!(extract_reading(&completion), "**Past (The Fool)**\nText.");
    }

    #[tokio::test]
    async fn test_generate_reading_returns_cards_in_selection_order() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .body_contains("Past: The High Priestess")
                    .body_contains("Future: The Magician");
                then.status(200)
                    .json_body(completion_body(json!("**Past (The High Priestess)** ...")));
            })
            .await;
        let store = MemoryCardStore::with_cards(&DECK);

        let response = generate_reading(
            &store,
            &llm(server.base_url(), Some("sk-test")),
            &request(Some(vec![3, 1, 2]), "What about my career?"),
        )
        .await
        .unwrap();

        mock.assert_async().await;
        let ids: Vec<i32> = response.cards.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(response.reading, "**Past (The High Priestess)** ...");
    }

    #[tokio::test]
    async fn test_generate_reading_unknown_card_makes_no_call() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(completion_body(json!("x")));
            })
            .await;
        let store = MemoryCardStore::with_cards(&DECK);

        let err = generate_reading(
            &store,
            &llm(server.base_url(), Some("sk-test")),
            &request(Some(vec![1, 2, 999]), "Money?"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::CardsNotFound));
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_generate_reading_invalid_count_skips_store_and_service() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(completion_body(json!("x")));
            })
            .await;
        let store = MemoryCardStore::with_cards(&DECK);

        for ids in [vec![1, 2], vec![1, 2, 3, 4]] {
            let err = generate_reading(
                &store,
                &llm(server.base_url(), Some("sk-test")),
                &request(Some(ids), "Money?"),
            )
            .await
            .unwrap_err();
            assert_eq!(err.to_string(), "You must select exactly 3 cards.");
        }

        assert_eq!(store.lookups(), 0);
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_generate_reading_without_key_is_misconfigured() {
        let store = MemoryCardStore::with_cards(&DECK);

        let err = generate_reading(
            &store,
            &llm("http://127.0.0.1:9".to_string(), None),
            &request(Some(vec![1, 2, 3]), "Health?"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Misconfigured(_)));
    }

    #[tokio::test]
    async fn test_generate_reading_blank_completion_uses_fallback() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(completion_body(json!("  ")));
            })
            .await;
        let store = MemoryCardStore::with_cards(&DECK);

        let response = generate_reading(
            &store,
            &llm(server.base_url(), Some("sk-test")),
            &request(Some(vec![1, 2, 3]), "Travel?"),
        )
        .await
        .unwrap();

        assert_eq!(response.reading, FALLBACK_READING);
    }

    #[tokio::test]
    async fn test_generate_reading_passes_upstream_status_through() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(429).body("{\"error\":\"slow down\"}");
            })
            .await;
        let store = MemoryCardStore::with_cards(&DECK);

        let err = generate_reading(
            &store,
            &llm(server.base_url(), Some("sk-test")),
            &request(Some(vec![1, 2, 3]), "Travel?"),
        )
        .await
        .unwrap_err();

        match err {
            AppError::Upstream { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "{\"error\":\"slow down\"}");
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_narrative_service_times_out_as_server_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200)
                    .delay(Duration::from_secs(3600))
                    .json_body(completion_body(json!("too late")));
            })
            .await;
        let store = MemoryCardStore::with_cards(&DECK);
        let client = llm(server.base_url(), Some("sk-test"));

        let started = tokio::time::Instant::now();
        let err = generate_reading(
            &store,
            &client,
            &request(Some(vec![1, 2, 3]), "Will it rain?"),
        )
        .await
        .unwrap_err();
        let elapsed = started.elapsed();

        assert!(
            elapsed >= REQUEST_TIMEOUT && elapsed < REQUEST_TIMEOUT + Duration::from_secs(1),
            "expected the call to stop at {REQUEST_TIMEOUT:?}, took {elapsed:?}"
        );
        assert!(matches!(err, AppError::Llm(_)), "got {err:?}");
        assert!(err.to_string().contains("HTTP error"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
