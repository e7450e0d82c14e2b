//! Collaborator fan-out, fixed-order joins, and text-then-audio pipelining.
//!
//! Every collaborator call is submitted to the worker pool and awaited as a
//! future. Two disciplines hold throughout:
//!
//! - **Join-in-fixed-order**: concurrently issued calls bind to result
//!   positions, never completion order, and any failure fails the whole join.
//! - **Text-then-audio pipelining**: synthesis is started *before* the paired
//!   JSON frame goes out, and the binary frame follows once synthesis
//!   resolves — so the client always observes text first.

use super::{error::SessionError, protocol::ServerFrame, transport::SessionTransport};
use crate::state::AppState;
use base64::Engine;
use sabaq_core::{
    cache::BoundedCache,
    collaborator::{Assessment, CollaboratorError, Transcript},
    offload::TaskHandle,
    script::LanguageMode,
};
use std::sync::Arc;
use tracing::debug;

/// Awaits a pool task and flattens the collaborator result.
async fn joined<T>(task: TaskHandle<Result<T, CollaboratorError>>) -> Result<T, SessionError> {
    Ok(task.join().await??)
}

/// Decodes an `audio_base64` payload off the event loop.
pub async fn decode_audio(state: &AppState, encoded: String) -> Result<Vec<u8>, SessionError> {
    let decoded = state
        .pool
        .submit(move || base64::engine::general_purpose::STANDARD.decode(encoded))
        .join()
        .await?;
    Ok(decoded?)
}

pub async fn transcribe(state: &AppState, audio: Vec<u8>) -> Result<Transcript, SessionError> {
    let stt = Arc::clone(&state.stt);
    joined(state.pool.submit(move || stt.transcribe(&audio))).await
}

pub async fn assess(
    state: &AppState,
    reference: &str,
    attempt: &str,
    mode: LanguageMode,
) -> Result<Assessment, SessionError> {
    let scorer = Arc::clone(&state.scorer);
    let reference = reference.to_owned();
    let attempt = attempt.to_owned();
    joined(
        state
            .pool
            .submit(move || scorer.assess(&reference, &attempt, mode)),
    )
    .await
}

/// Translates `text` into Urdu and English concurrently.
///
/// Both legs run on the pool and memoize through their caches; the result is
/// always `(urdu, english)` regardless of which call resolves first, and
/// either failure fails the pair.
pub async fn translate_pair(
    state: &AppState,
    text: &str,
) -> Result<(String, String), SessionError> {
    let urdu_task = {
        let translator = Arc::clone(&state.translator);
        let cache = Arc::clone(&state.urdu_cache);
        let source = text.to_owned();
        state
            .pool
            .submit(move || through_cache(&cache, &source, |t| translator.to_urdu(t)))
    };
    let english_task = {
        let translator = Arc::clone(&state.translator);
        let cache = Arc::clone(&state.english_cache);
        let source = text.trim().to_owned();
        state
            .pool
            .submit(move || through_cache(&cache, &source, |t| translator.to_english(t)))
    };
    let (urdu, english) = tokio::try_join!(joined(urdu_task), joined(english_task))?;
    Ok((urdu, english))
}

fn through_cache(
    cache: &BoundedCache<String>,
    text: &str,
    fetch: impl FnOnce(&str) -> Result<String, CollaboratorError>,
) -> Result<String, CollaboratorError> {
    if let Some(hit) = cache.get(text) {
        return Ok(hit);
    }
    let value = fetch(text)?;
    cache.put(text, value.clone());
    Ok(value)
}

/// Sends `frame` and its spoken rendition, text first.
///
/// On a speech-cache hit the synthesis collaborator is not called at all. On
/// a miss, synthesis is submitted to the pool before the JSON frame is sent,
/// so the text reaches the client while the audio is still being produced;
/// the result is cached for the rest of the process lifetime.
pub async fn present<T: SessionTransport + ?Sized>(
    transport: &mut T,
    state: &AppState,
    frame: ServerFrame,
) -> Result<(), SessionError> {
    let line = frame.response.trim().to_owned();
    if let Some(audio) = state.speech_cache.get(&line) {
        debug!(step = ?frame.step, "speech cache hit");
        transport.send_frame(frame).await;
        transport.send_audio(audio).await;
        return Ok(());
    }

    let task = {
        let synthesizer = Arc::clone(&state.synthesizer);
        let text = line.clone();
        state.pool.submit(move || synthesizer.synthesize(&text))
    };
    // The text frame goes out while synthesis is still running.
    transport.send_frame(frame).await;
    let audio = joined(task).await?;
    transport.send_audio(audio.clone()).await;
    state.speech_cache.put(line, audio);
    Ok(())
}
