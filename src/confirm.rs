use dialoguer::Input;
use rand::seq::SliceRandom;
use rand::Rng;

/// Challenge words for the second confirmation stage
pub const GOODBYE_WORDS: [&str; 7] = [
    "goodbye",
    "adieu",
    "ciao",
    "adios",
    "sayonara",
    "totsiens",
    "Wiedersehen",
];

const PROCEED_PROMPT: &str = "Do you wish to proceed with deprovisioning the specified users? (Y/N)";

/// Stage 1: only a lone `y` or `Y` counts as yes.
pub fn accepts_proceed(answer: &str) -> bool {
    answer.eq_ignore_ascii_case("y")
}

pub fn choose_challenge<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    GOODBYE_WORDS.choose(rng).copied().unwrap_or(GOODBYE_WORDS[0])
}

/// Stage 2: exact, case-sensitive retype of the challenge word.
pub fn accepts_challenge(challenge: &str, typed: &str) -> bool {
    typed == challenge
}

pub fn challenge_prompt(challenge: &str) -> String {
    format!(
        "DOUBLE CHECK: Do you wish to proceed with deprovisioning the specified users? Please type the word '{}' to proceed",
        challenge
    )
}

/// Two-stage confirmation before any account is deleted.
///
/// `ask` shows a prompt and returns the operator's answer. Returns
/// `Ok(false)` as soon as either stage is answered wrongly; there are no
/// retries.
pub fn double_check<F, R, E>(mut ask: F, rng: &mut R) -> Result<bool, E>
where
    F: FnMut(&str) -> Result<String, E>,
    R: Rng + ?Sized,
{
    if !accepts_proceed(&ask(PROCEED_PROMPT)?) {
        return Ok(false);
    }

    let challenge = choose_challenge(rng);
    Ok(accepts_challenge(challenge, &ask(&challenge_prompt(challenge))?))
}

/// Free-text prompt; an empty answer is returned as-is
pub fn prompt_text(prompt: &str) -> dialoguer::Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
}

/// [`double_check`] against the terminal
pub fn proceed_double_check() -> dialoguer::Result<bool> {
    double_check(prompt_text, &mut rand::thread_rng())
}
