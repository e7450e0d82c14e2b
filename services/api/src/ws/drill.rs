//! The fixed multi-phase pronunciation drill, one state machine per session.
//!
//! The learner opens with an Urdu utterance; the tutor echoes it back,
//! presents the English sentence, and then loops on repeat attempts until the
//! scoring collaborator judges one correct. Phases advance in a fixed forward
//! order — the only backward edges are the no-speech retries and the feedback
//! loop. The language mode changes prompt wording only, never the structure.

use super::{
    error::SessionError,
    gate,
    orchestrate,
    protocol::{Ack, ClientFrame, ServerFrame, Step},
    transport::SessionTransport,
};
use crate::state::AppState;
use sabaq_core::{
    collaborator::Assessment,
    script::{self, LanguageMode},
};
use tracing::{debug, info, warn};

/// Per-connection drill state. Owned by the session task; never shared.
#[derive(Debug, Default)]
pub struct Session {
    pub language_mode: LanguageMode,
    /// Raw transcript of the opening utterance.
    pub transcribed_text: String,
    /// The utterance rendered in Urdu.
    pub transcribed_urdu: String,
    /// The utterance translated to English — the drill's reference sentence.
    pub translated_english: String,
    /// `translated_english` split into drill tokens.
    pub word_sequence: Vec<String>,
    /// Drill turns completed (a turn ends when an attempt scores correct).
    pub turns_completed: u32,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the control overrides any inbound frame may carry.
    pub fn absorb(&mut self, frame: &ClientFrame) {
        if let Some(mode) = frame.language_mode {
            self.language_mode = mode;
        }
    }
}

/// Whether a transcription belongs to the opening utterance or to a repeat
/// attempt inside the feedback loop. Decides both the no-speech retry target
/// and what happens with the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Utterance,
    Attempt,
}

/// The drill's named phases. Variants carry the data that flows forward.
#[derive(Debug)]
enum Phase {
    Listening,
    Transcribing { audio: Vec<u8>, origin: Origin },
    NoSpeech { origin: Origin },
    EnglishEdgeCase { detected_language: String },
    Translating,
    PresentYouSaid,
    PresentRepeatPrompt,
    PresentFullSentence,
    AwaitAttempt,
    Evaluate { attempt: String },
    PresentFeedback { verdict: Assessment },
    PresentWordByWord,
}

impl Phase {
    fn label(&self) -> &'static str {
        match self {
            Self::Listening => "listening",
            Self::Transcribing { .. } => "transcribing",
            Self::NoSpeech { .. } => "no_speech",
            Self::EnglishEdgeCase { .. } => "english_edge_case",
            Self::Translating => "translating",
            Self::PresentYouSaid => "present_you_said",
            Self::PresentRepeatPrompt => "present_repeat_prompt",
            Self::PresentFullSentence => "present_full_sentence",
            Self::AwaitAttempt => "await_attempt",
            Self::Evaluate { .. } => "evaluate",
            Self::PresentFeedback { .. } => "present_feedback",
            Self::PresentWordByWord => "present_word_by_word",
        }
    }
}

/// Drives one session's drill until disconnect or a fatal error.
pub struct DrillRunner<'a, T> {
    state: &'a AppState,
    transport: &'a mut T,
    pub session: Session,
}

impl<'a, T: SessionTransport> DrillRunner<'a, T> {
    pub fn new(state: &'a AppState, transport: &'a mut T) -> Self {
        Self {
            state,
            transport,
            session: Session::new(),
        }
    }

    /// Runs the phase machine. Only ever returns with an error — a clean
    /// disconnect surfaces as [`SessionError::Disconnected`].
    pub async fn run(&mut self) -> Result<(), SessionError> {
        let mut phase = Phase::Listening;
        loop {
            debug!(phase = phase.label(), "entering phase");
            phase = match self.step(phase).await {
                Ok(next) => next,
                Err(e) if e.is_recoverable() => {
                    warn!(error = %e, "collaborator failure; resetting drill");
                    self.transport
                        .send_frame(ServerFrame::new(
                            Step::Error,
                            script::trouble(self.session.language_mode),
                        ))
                        .await;
                    Phase::Listening
                }
                Err(e) => return Err(e),
            };
        }
    }

    async fn step(&mut self, phase: Phase) -> Result<Phase, SessionError> {
        match phase {
            Phase::Listening => self.listen().await,
            Phase::Transcribing { audio, origin } => self.transcribe(audio, origin).await,
            Phase::NoSpeech { origin } => self.no_speech(origin).await,
            Phase::EnglishEdgeCase { detected_language } => {
                self.english_edge_case(detected_language).await
            }
            Phase::Translating => self.translating().await,
            Phase::PresentYouSaid => self.present_you_said().await,
            Phase::PresentRepeatPrompt => self.present_repeat_prompt().await,
            Phase::PresentFullSentence => self.present_full_sentence().await,
            Phase::AwaitAttempt => self.await_attempt().await,
            Phase::Evaluate { attempt } => self.evaluate(attempt).await,
            Phase::PresentFeedback { verdict } => self.present_feedback(verdict).await,
            Phase::PresentWordByWord => self.present_word_by_word().await,
        }
    }

    /// Waits for the drill's opening utterance.
    async fn listen(&mut self) -> Result<Phase, SessionError> {
        let frame = self.receive_submission().await?;
        let Some(encoded) = frame.audio_base64 else {
            self.transport
                .send_frame(ServerFrame::new(Step::Error, script::MISSING_AUDIO_FIELD))
                .await;
            return Ok(Phase::Listening);
        };
        match orchestrate::decode_audio(self.state, encoded).await {
            Ok(audio) => Ok(Phase::Transcribing {
                audio,
                origin: Origin::Utterance,
            }),
            Err(SessionError::Decode(error)) => {
                warn!(%error, "failed to decode audio payload");
                self.transport
                    .send_frame(ServerFrame::new(Step::Error, script::UNDECODABLE_AUDIO))
                    .await;
                Ok(Phase::Listening)
            }
            Err(other) => Err(other),
        }
    }

    async fn transcribe(&mut self, audio: Vec<u8>, origin: Origin) -> Result<Phase, SessionError> {
        let transcript = orchestrate::transcribe(self.state, audio).await?;
        if transcript.text.trim().is_empty() {
            return Ok(Phase::NoSpeech { origin });
        }
        match origin {
            Origin::Utterance => {
                self.session.transcribed_text = transcript.text;
                if transcript.is_english {
                    Ok(Phase::EnglishEdgeCase {
                        detected_language: transcript.language_code,
                    })
                } else {
                    Ok(Phase::Translating)
                }
            }
            Origin::Attempt => Ok(Phase::Evaluate {
                attempt: transcript.text,
            }),
        }
    }

    async fn no_speech(&mut self, origin: Origin) -> Result<Phase, SessionError> {
        self.transport
            .send_frame(ServerFrame::new(
                Step::NoSpeech,
                script::no_speech(self.session.language_mode),
            ))
            .await;
        Ok(match origin {
            Origin::Utterance => Phase::Listening,
            Origin::Attempt => Phase::AwaitAttempt,
        })
    }

    /// The learner spoke English where Urdu was expected: acknowledge and
    /// fall back to listening.
    async fn english_edge_case(
        &mut self,
        detected_language: String,
    ) -> Result<Phase, SessionError> {
        let frame = ServerFrame::new(
            Step::EnglishInputEdgeCase,
            script::english_input(self.session.language_mode),
        )
        .detected_language(detected_language);
        orchestrate::present(self.transport, self.state, frame).await?;
        Ok(Phase::Listening)
    }

    async fn translating(&mut self) -> Result<Phase, SessionError> {
        let (urdu, english) =
            orchestrate::translate_pair(self.state, &self.session.transcribed_text).await?;
        self.session.transcribed_urdu = urdu;
        self.session.word_sequence = english.split_whitespace().map(str::to_owned).collect();
        self.session.translated_english = english;
        Ok(Phase::PresentYouSaid)
    }

    async fn present_you_said(&mut self) -> Result<Phase, SessionError> {
        let frame = ServerFrame::new(
            Step::YouSaidAudio,
            script::you_said(self.session.language_mode, &self.session.transcribed_urdu),
        )
        .english_sentence(self.session.translated_english.clone())
        .urdu_sentence(self.session.transcribed_urdu.clone())
        .words(self.session.word_sequence.clone());
        orchestrate::present(self.transport, self.state, frame).await?;
        gate::await_ack(
            self.transport,
            &mut self.session,
            Ack::YouSaidComplete,
            self.state.config.gate_timeout,
        )
        .await?;
        Ok(Phase::PresentRepeatPrompt)
    }

    /// Text-only step: the client drives word-by-word playback itself.
    async fn present_repeat_prompt(&mut self) -> Result<Phase, SessionError> {
        let frame = ServerFrame::new(
            Step::RepeatPrompt,
            script::repeat_prompt(self.session.language_mode, &self.session.translated_english),
        )
        .english_sentence(self.session.translated_english.clone())
        .urdu_sentence(self.session.transcribed_urdu.clone())
        .words(self.session.word_sequence.clone());
        self.transport.send_frame(frame).await;
        gate::await_ack(
            self.transport,
            &mut self.session,
            Ack::WordByWordComplete,
            self.state.config.gate_timeout,
        )
        .await?;
        Ok(Phase::PresentFullSentence)
    }

    async fn present_full_sentence(&mut self) -> Result<Phase, SessionError> {
        let frame = ServerFrame::new(
            Step::FullSentenceAudio,
            script::full_sentence(self.session.language_mode, &self.session.translated_english),
        )
        .english_sentence(self.session.translated_english.clone());
        orchestrate::present(self.transport, self.state, frame).await?;
        Ok(Phase::AwaitAttempt)
    }

    /// Waits for the learner's repeat attempt inside the feedback loop.
    async fn await_attempt(&mut self) -> Result<Phase, SessionError> {
        let frame = self.receive_submission().await?;
        let Some(encoded) = frame.audio_base64 else {
            self.transport
                .send_frame(ServerFrame::new(
                    Step::Error,
                    script::missing_audio(self.session.language_mode),
                ))
                .await;
            return Ok(Phase::AwaitAttempt);
        };
        match orchestrate::decode_audio(self.state, encoded).await {
            Ok(audio) => Ok(Phase::Transcribing {
                audio,
                origin: Origin::Attempt,
            }),
            Err(SessionError::Decode(error)) => {
                warn!(%error, "failed to decode attempt audio");
                self.transport
                    .send_frame(ServerFrame::new(Step::Error, script::UNDECODABLE_AUDIO))
                    .await;
                Ok(Phase::AwaitAttempt)
            }
            Err(other) => Err(other),
        }
    }

    async fn evaluate(&mut self, attempt: String) -> Result<Phase, SessionError> {
        let verdict = orchestrate::assess(
            self.state,
            &self.session.translated_english,
            &attempt,
            self.session.language_mode,
        )
        .await?;
        Ok(Phase::PresentFeedback { verdict })
    }

    async fn present_feedback(&mut self, verdict: Assessment) -> Result<Phase, SessionError> {
        if verdict.is_correct {
            let frame = ServerFrame::new(Step::AwaitNext, verdict.feedback_text).is_true(true);
            orchestrate::present(self.transport, self.state, frame).await?;
            self.session.turns_completed += 1;
            info!(turns = self.session.turns_completed, "drill turn completed");
            return Ok(Phase::Listening);
        }
        let frame = ServerFrame::new(Step::FeedbackStep, verdict.feedback_text).is_true(false);
        orchestrate::present(self.transport, self.state, frame).await?;
        gate::await_ack(
            self.transport,
            &mut self.session,
            Ack::FeedbackComplete,
            self.state.config.gate_timeout,
        )
        .await?;
        Ok(Phase::PresentWordByWord)
    }

    /// Text-only step, like the repeat prompt.
    async fn present_word_by_word(&mut self) -> Result<Phase, SessionError> {
        let frame = ServerFrame::new(
            Step::WordByWord,
            script::word_by_word(self.session.language_mode, &self.session.translated_english),
        )
        .english_sentence(self.session.translated_english.clone())
        .urdu_sentence(self.session.transcribed_urdu.clone())
        .words(self.session.word_sequence.clone());
        self.transport.send_frame(frame).await;
        gate::await_ack(
            self.transport,
            &mut self.session,
            Ack::WordByWordComplete,
            self.state.config.gate_timeout,
        )
        .await?;
        Ok(Phase::PresentFullSentence)
    }

    /// Bounded wait for a decodable frame; malformed frames get an `error`
    /// step and the wait continues.
    async fn receive_submission(&mut self) -> Result<ClientFrame, SessionError> {
        let timeout = self.state.config.receive_timeout;
        let wait = async {
            loop {
                let raw = self.transport.recv_text().await?;
                match serde_json::from_str::<ClientFrame>(&raw) {
                    Ok(frame) => {
                        self.session.absorb(&frame);
                        return Ok(frame);
                    }
                    Err(e) => {
                        warn!(error = %e, "malformed frame while awaiting audio");
                        self.transport
                            .send_frame(ServerFrame::new(Step::Error, script::INVALID_PAYLOAD))
                            .await;
                    }
                }
            }
        };
        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| SessionError::ReceiveTimeout)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::testing::{
        MockTransport, Sent, StubScorer, StubStt, StubSynthesizer, StubTranslator, app_state,
        audio_frame,
    };
    use sabaq_core::collaborator::Transcript;
    use std::sync::Arc;

    fn transcript(text: &str, language_code: &str, is_english: bool) -> Transcript {
        Transcript {
            text: text.to_string(),
            language_code: language_code.to_string(),
            is_english,
        }
    }

    fn verdict(is_correct: bool, feedback: &str) -> Assessment {
        Assessment {
            is_correct,
            feedback_text: feedback.to_string(),
        }
    }

    struct Fixture {
        state: crate::state::AppState,
        synthesizer: Arc<StubSynthesizer>,
    }

    fn fixture(transcripts: Vec<Transcript>, verdicts: Vec<Assessment>) -> Fixture {
        let synthesizer = Arc::new(StubSynthesizer::new());
        let state = app_state(
            Arc::new(StubStt::new(transcripts)),
            Arc::new(StubTranslator::new("شکریہ", "Thank you")),
            Arc::clone(&synthesizer) as Arc<dyn sabaq_core::collaborator::Synthesizer>,
            Arc::new(StubScorer::new(verdicts)),
        );
        Fixture { state, synthesizer }
    }

    /// Runs the drill against a scripted transport until the inbound script
    /// is exhausted (which surfaces as a clean disconnect).
    async fn run_drill(fixture: &Fixture, transport: &mut MockTransport) -> Session {
        let mut runner = DrillRunner::new(&fixture.state, transport);
        let result = runner.run().await;
        assert!(
            matches!(result, Err(SessionError::Disconnected)),
            "drill should end by disconnect, got {result:?}"
        );
        runner.session
    }

    fn steps(transport: &MockTransport) -> Vec<Step> {
        transport
            .sent
            .iter()
            .filter_map(|sent| match sent {
                Sent::Frame(frame) => Some(frame.step),
                Sent::Audio(_) => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn scenario_no_speech_returns_to_listening() {
        let fixture = fixture(vec![transcript("   ", "ur", false)], vec![]);
        let mut transport = MockTransport::new([audio_frame()]);
        run_drill(&fixture, &mut transport).await;

        assert_eq!(steps(&transport), vec![Step::NoSpeech]);
        // No audio accompanies the no-speech notice.
        assert!(transport.sent.iter().all(|s| matches!(s, Sent::Frame(_))));
    }

    #[tokio::test]
    async fn scenario_english_input_edge_case() {
        let fixture = fixture(vec![transcript("thank you", "en", true)], vec![]);
        let mut transport = MockTransport::new([audio_frame()]);
        run_drill(&fixture, &mut transport).await;

        assert_eq!(transport.sent.len(), 2);
        match &transport.sent[0] {
            Sent::Frame(frame) => {
                assert_eq!(frame.step, Step::EnglishInputEdgeCase);
                assert_eq!(frame.detected_language.as_deref(), Some("en"));
            }
            other => panic!("expected JSON frame first, got {other:?}"),
        }
        assert!(matches!(&transport.sent[1], Sent::Audio(_)));
    }

    #[tokio::test]
    async fn scenario_normal_urdu_input_presents_the_drill() {
        let fixture = fixture(vec![transcript("شکریہ", "ur", false)], vec![]);
        let mut transport = MockTransport::new([
            audio_frame(),
            r#"{"type": "you_said_complete"}"#.to_string(),
            r#"{"type": "word_by_word_complete"}"#.to_string(),
        ]);
        run_drill(&fixture, &mut transport).await;

        assert_eq!(
            steps(&transport),
            vec![Step::YouSaidAudio, Step::RepeatPrompt, Step::FullSentenceAudio]
        );

        let you_said = match &transport.sent[0] {
            Sent::Frame(frame) => frame,
            other => panic!("expected JSON frame first, got {other:?}"),
        };
        assert_eq!(you_said.urdu_sentence.as_deref(), Some("شکریہ"));
        assert_eq!(you_said.english_sentence.as_deref(), Some("Thank you"));
        assert_eq!(
            you_said.words.as_deref(),
            Some(&["Thank".to_string(), "you".to_string()][..])
        );
        // you_said text is followed by its audio before anything else.
        assert!(matches!(&transport.sent[1], Sent::Audio(_)));
    }

    #[tokio::test]
    async fn scenario_feedback_loop_two_misses_then_success() {
        let fixture = fixture(
            vec![
                transcript("شکریہ", "ur", false),
                transcript("tank yu", "en", false),
                transcript("thank yu", "en", false),
                transcript("thank you", "en", false),
            ],
            vec![
                verdict(false, "Let's try again."),
                verdict(false, "Let's try again."),
                verdict(true, "Great job! Let's try the next sentence."),
            ],
        );
        let mut transport = MockTransport::new([
            audio_frame(),
            r#"{"type": "you_said_complete"}"#.to_string(),
            r#"{"type": "word_by_word_complete"}"#.to_string(),
            // attempt 1: incorrect
            audio_frame(),
            r#"{"type": "feedback_complete"}"#.to_string(),
            r#"{"type": "word_by_word_complete"}"#.to_string(),
            // attempt 2: incorrect
            audio_frame(),
            r#"{"type": "feedback_complete"}"#.to_string(),
            r#"{"type": "word_by_word_complete"}"#.to_string(),
            // attempt 3: correct
            audio_frame(),
        ]);
        let session = run_drill(&fixture, &mut transport).await;

        let sent_steps = steps(&transport);
        assert_eq!(
            sent_steps.iter().filter(|s| **s == Step::FeedbackStep).count(),
            2
        );
        assert_eq!(
            sent_steps.iter().filter(|s| **s == Step::AwaitNext).count(),
            1
        );
        assert_eq!(
            sent_steps.iter().filter(|s| **s == Step::FullSentenceAudio).count(),
            3
        );
        // await_next comes last and carries is_true.
        let last_frame = transport
            .sent
            .iter()
            .rev()
            .find_map(|s| match s {
                Sent::Frame(f) => Some(f),
                Sent::Audio(_) => None,
            })
            .unwrap();
        assert_eq!(last_frame.step, Step::AwaitNext);
        assert_eq!(last_frame.is_true, Some(true));
        for frame in transport.sent.iter().filter_map(|s| match s {
            Sent::Frame(f) if f.step == Step::FeedbackStep => Some(f),
            _ => None,
        }) {
            assert_eq!(frame.is_true, Some(false));
        }
        assert_eq!(session.turns_completed, 1);

        // Call-count invariant: you_said, full sentence (cached on replays),
        // the repeated incorrect feedback line (cached once), and the success
        // line — four syntheses for the whole exchange.
        assert_eq!(fixture.synthesizer.calls(), 4);
    }

    #[tokio::test]
    async fn no_speech_during_attempt_reenters_attempt_wait() {
        let fixture = fixture(
            vec![
                transcript("شکریہ", "ur", false),
                transcript("", "ur", false),
                transcript("thank you", "en", false),
            ],
            vec![verdict(true, "Great job!")],
        );
        let mut transport = MockTransport::new([
            audio_frame(),
            r#"{"type": "you_said_complete"}"#.to_string(),
            r#"{"type": "word_by_word_complete"}"#.to_string(),
            audio_frame(), // empty transcript
            audio_frame(), // correct attempt
        ]);
        let session = run_drill(&fixture, &mut transport).await;

        let sent_steps = steps(&transport);
        assert!(sent_steps.contains(&Step::NoSpeech));
        assert_eq!(sent_steps.last(), Some(&Step::AwaitNext));
        assert_eq!(session.turns_completed, 1);
    }

    #[tokio::test]
    async fn missing_audio_field_is_answered_with_error_step() {
        let fixture = fixture(vec![transcript("شکریہ", "ur", false)], vec![]);
        let mut transport = MockTransport::new([r#"{"something_else": true}"#.to_string()]);
        run_drill(&fixture, &mut transport).await;

        match &transport.sent[0] {
            Sent::Frame(frame) => {
                assert_eq!(frame.step, Step::Error);
                assert_eq!(frame.response, script::MISSING_AUDIO_FIELD);
            }
            other => panic!("expected error frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_audio_is_answered_with_error_step() {
        let fixture = fixture(vec![], vec![]);
        let mut transport =
            MockTransport::new([r#"{"audio_base64": "!!not-base64!!"}"#.to_string()]);
        run_drill(&fixture, &mut transport).await;

        match &transport.sent[0] {
            Sent::Frame(frame) => {
                assert_eq!(frame.step, Step::Error);
                assert_eq!(frame.response, script::UNDECODABLE_AUDIO);
            }
            other => panic!("expected error frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_answered_with_error_step_and_wait_continues() {
        let fixture = fixture(vec![transcript("   ", "ur", false)], vec![]);
        let mut transport = MockTransport::new(["not json".to_string(), audio_frame()]);
        run_drill(&fixture, &mut transport).await;

        let sent_steps = steps(&transport);
        assert_eq!(sent_steps, vec![Step::Error, Step::NoSpeech]);
        match &transport.sent[0] {
            Sent::Frame(frame) => assert_eq!(frame.response, script::INVALID_PAYLOAD),
            other => panic!("expected error frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn collaborator_failure_resets_to_listening() {
        let synthesizer = Arc::new(StubSynthesizer::new());
        let state = app_state(
            Arc::new(StubStt::new(vec![transcript("شکریہ", "ur", false)])),
            Arc::new(StubTranslator::failing()),
            Arc::clone(&synthesizer) as Arc<dyn sabaq_core::collaborator::Synthesizer>,
            Arc::new(StubScorer::new(vec![])),
        );
        let fixture = Fixture { state, synthesizer };
        let mut transport = MockTransport::new([audio_frame()]);
        run_drill(&fixture, &mut transport).await;

        // Translation failed, so the drill apologized and went back to
        // listening instead of dying.
        match &transport.sent[0] {
            Sent::Frame(frame) => {
                assert_eq!(frame.step, Step::Error);
                assert_eq!(frame.response, script::trouble(LanguageMode::Urdu));
            }
            other => panic!("expected error frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn language_mode_override_switches_prompt_register() {
        let fixture = fixture(vec![transcript("شکریہ", "ur", false)], vec![]);
        let mut transport = MockTransport::new([
            audio_frame(),
            r#"{"type": "you_said_complete", "language_mode": "english"}"#.to_string(),
            r#"{"type": "word_by_word_complete"}"#.to_string(),
        ]);
        run_drill(&fixture, &mut transport).await;

        // The opening frame carried no mode, so you_said is in Urdu register.
        let frames: Vec<_> = transport
            .sent
            .iter()
            .filter_map(|s| match s {
                Sent::Frame(f) => Some(f),
                Sent::Audio(_) => None,
            })
            .collect();
        assert!(frames[0].response.contains("آپ نے کہا"));
        // The ack flipped the mode, so the repeat prompt is English.
        assert_eq!(frames[1].step, Step::RepeatPrompt);
        assert!(frames[1].response.starts_with("The English sentence is"));
    }

    #[tokio::test]
    async fn attempt_wait_rejects_frames_without_audio() {
        let fixture = fixture(
            vec![
                transcript("شکریہ", "ur", false),
                transcript("thank you", "en", false),
            ],
            vec![verdict(true, "Great job!")],
        );
        let mut transport = MockTransport::new([
            audio_frame(),
            r#"{"type": "you_said_complete"}"#.to_string(),
            r#"{"type": "word_by_word_complete"}"#.to_string(),
            r#"{"language_mode": "english"}"#.to_string(), // no audio
            audio_frame(),
        ]);
        run_drill(&fixture, &mut transport).await;

        let error_frame = transport
            .sent
            .iter()
            .find_map(|s| match s {
                Sent::Frame(f) if f.step == Step::Error => Some(f),
                _ => None,
            })
            .unwrap();
        // The mode override on the audio-less frame applied before the reply.
        assert_eq!(error_frame.response, script::missing_audio(LanguageMode::English));
    }
}
