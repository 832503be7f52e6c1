//! Line-prompt fallback used when stdin/stdout are not terminals.

use std::io::{BufRead, Write};

use anyhow::{Result, bail};

use symcheck_client::SymptomBackend;
use symcheck_core::{InsightOutcome, Sex, Step, ValidationOutcome, WizardController};

pub async fn run_prompt<R, W>(
    wizard: &mut WizardController,
    backend: &dyn SymptomBackend,
    input: &mut R,
    out: &mut W,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    writeln!(out, "Symptom Checker")?;
    loop {
        match wizard.step() {
            Step::Intake => {
                writeln!(out, "\nTell me a little about yourself")?;
                let Some(age) = prompt(input, out, "Age")? else {
                    return Ok(());
                };
                wizard.set_age(&age);
                let Some(sex) = prompt(input, out, "Sex (male/female)")? else {
                    return Ok(());
                };
                match sex.parse::<Sex>() {
                    Ok(sex) => wizard.set_sex(sex),
                    Err(err) => {
                        writeln!(out, "{err}")?;
                        continue;
                    }
                }
                if let Err(err) = wizard.advance_intake() {
                    writeln!(out, "{err}")?;
                }
            }
            Step::SymptomEntry => {
                writeln!(out, "\nDescribe Your Symptom")?;
                let Some(symptom) = prompt(input, out, "Symptom")? else {
                    return Ok(());
                };
                wizard.set_main_symptom(symptom);
                if !wizard.can_advance() {
                    writeln!(out, "Please describe your symptom.")?;
                    continue;
                }
                writeln!(out, "Validating...")?;
                match wizard.submit_symptom(backend).await? {
                    ValidationOutcome::Accepted => {}
                    ValidationOutcome::Rejected(_) | ValidationOutcome::Unavailable => {
                        if let Some(warning) = wizard.warning() {
                            writeln!(out, "{warning}")?;
                        }
                    }
                }
            }
            Step::Clarification => {
                writeln!(out, "\nAnswer the following questions")?;
                if let Some(questions) = wizard.ensure_questions() {
                    for (index, question) in questions.iter().enumerate() {
                        writeln!(out, "  {}. {question}", index + 1)?;
                    }
                }
                let Some(answer) = prompt(input, out, "Your answer")? else {
                    return Ok(());
                };
                wizard.set_refine_answer(answer);
                if !wizard.can_advance() {
                    writeln!(out, "Please answer the questions.")?;
                    continue;
                }
                writeln!(out, "Loading...")?;
                if wizard.request_insight(backend).await? == InsightOutcome::Failed {
                    if let Some(alert) = wizard.alert() {
                        writeln!(out, "{alert}")?;
                    }
                    wizard.dismiss_alert();
                }
            }
            Step::Result => {
                writeln!(out, "\nYour Health Insights\n")?;
                writeln!(out, "{}", wizard.insight().unwrap_or_default())?;
                writeln!(out, "\nInsights are retrieved from medical knowledge sources.")?;
                let Some(again) = prompt(input, out, "Start over? (yes/no)")? else {
                    return Ok(());
                };
                match parse_bool_like(&again) {
                    Ok(true) => wizard.start_over()?,
                    Ok(false) => return Ok(()),
                    Err(err) => writeln!(out, "{err}")?,
                }
            }
        }
    }
}

/// `None` on end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<Option<String>> {
    write!(out, "{label}: ")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(out)?;
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

pub(crate) fn parse_bool_like(raw: &str) -> Result<bool> {
    let normalized = raw.trim().to_lowercase();
    match normalized.as_str() {
        "y" | "yes" | "true" | "1" => Ok(true),
        "n" | "no" | "false" | "0" => Ok(false),
        _ => bail!("expected yes/no"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::io::Cursor;
    use std::sync::Mutex;
    use symcheck_client::{
        BackendError, ChatRequest, ChatResponse, ValidateRequest, ValidateResponse,
    };
    use symcheck_core::{INSIGHT_ERROR_MESSAGE, QUESTION_TEMPLATES};

    /// Rejects anything without "abdo"; chat fails once when asked to.
    struct KeywordBackend {
        fail_chat_once: Mutex<bool>,
    }

    impl KeywordBackend {
        fn new(fail_chat_once: bool) -> Self {
            Self {
                fail_chat_once: Mutex::new(fail_chat_once),
            }
        }
    }

    #[async_trait]
    impl SymptomBackend for KeywordBackend {
        async fn validate(
            &self,
            request: &ValidateRequest,
        ) -> Result<ValidateResponse, BackendError> {
            if request.main_symptom.contains("abdo") {
                Ok(ValidateResponse {
                    reply: Some("Symptom is valid.".to_string()),
                    ok: Some(true),
                })
            } else {
                Ok(ValidateResponse {
                    reply: Some(
                        "I'm sorry but I am trained only on abdominal pain in adults.".to_string(),
                    ),
                    ok: Some(false),
                })
            }
        }

        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
            let mut fail = self.fail_chat_once.lock().unwrap();
            if *fail {
                *fail = false;
                return Err(BackendError::Status {
                    endpoint: "http://127.0.0.1:8000/chat".to_string(),
                    status: 500,
                });
            }
            Ok(ChatResponse {
                reply: Some(format!("Advice for a {} aged {}", request.sex, request.age)),
            })
        }
    }

    async fn run(script: &str, backend: &KeywordBackend) -> String {
        let mut wizard = WizardController::with_rng(StdRng::seed_from_u64(5));
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        run_prompt(&mut wizard, backend, &mut input, &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn full_session_prints_questions_and_insight() {
        let backend = KeywordBackend::new(false);
        let output = run("34\nfemale\nlower abdomen pain\ncramping\nno\n", &backend).await;

        assert!(
            QUESTION_TEMPLATES
                .iter()
                .any(|set| output.contains(set.questions()[0]))
        );
        assert!(output.contains("Advice for a Female aged 34"));
    }

    #[tokio::test]
    async fn rejection_reprompts_symptom() {
        let backend = KeywordBackend::new(false);
        let output = run("34\nmale\nheadache\nabdominal cramps\nsharp\nno\n", &backend).await;

        assert!(output.contains("trained only on abdominal pain"));
        assert_eq!(output.matches("Describe Your Symptom").count(), 2);
        assert!(output.contains("Advice for a Male aged 34"));
    }

    #[tokio::test]
    async fn chat_failure_alerts_and_retries() {
        let backend = KeywordBackend::new(true);
        let output = run("50\nf\nabdominal ache\ndull\ndull\nno\n", &backend).await;

        assert!(output.contains(INSIGHT_ERROR_MESSAGE));
        assert!(output.contains("Advice for a Female aged 50"));
    }

    #[tokio::test]
    async fn invalid_intake_is_reprompted_and_eof_ends_quietly() {
        let backend = KeywordBackend::new(false);
        let output = run("0\nmale\n40\nother\n", &backend).await;

        assert!(output.contains("age must be a whole number"));
        assert!(output.contains("sex must be one of"));
    }

    #[test]
    fn bool_like_answers() {
        assert!(parse_bool_like("Yes").unwrap());
        assert!(!parse_bool_like(" n ").unwrap());
        assert!(parse_bool_like("maybe").is_err());
    }
}
