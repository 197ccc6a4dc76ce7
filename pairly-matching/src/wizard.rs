//! Profile dialogue as one ordered step table driven by a single `advance` function.
//! Creation walks every step; editing runs the one step of the chosen field.

use serde::{Deserialize, Serialize};

use crate::models::{Gender, InterestId, ProfileChanges, Seeking};
use crate::profile::{self, ProfileSubmission, MAX_INTERESTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Age,
    Gender,
    Seeking,
    City,
    Description,
    Photo,
    Interests,
}

/// Values collected so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub seeking: Option<Seeking>,
    pub city: Option<String>,
    pub description: Option<String>,
    pub photo: Option<String>,
    pub interests: Vec<InterestId>,
}

impl ProfileDraft {
    fn into_submission(self) -> Option<ProfileSubmission> {
        Some(ProfileSubmission {
            name: self.name?,
            age: self.age?,
            description: self.description?,
            photo: self.photo?,
            gender: self.gender?,
            seeking: self.seeking?,
            city: self.city,
            alias: None,
        })
    }

    fn changes_for(self, field: Field) -> ProfileChanges {
        let mut changes = ProfileChanges::default();
        match field {
            Field::Name => changes.name = self.name,
            Field::Age => changes.age = self.age,
            Field::Gender => changes.gender = self.gender,
            Field::Seeking => changes.seeking = self.seeking,
            Field::City => changes.city = Some(self.city),
            Field::Description => changes.description = self.description,
            Field::Photo => changes.photo_id = self.photo,
            Field::Interests => {}
        }
        changes
    }
}

type Parser = fn(&str, &mut ProfileDraft) -> Result<(), String>;

struct Step {
    field: Field,
    prompt: &'static str,
    parse: Parser,
}

const STEPS: &[Step] = &[
    Step { field: Field::Name, prompt: "What's your name?", parse: parse_name },
    Step { field: Field::Age, prompt: "How old are you?", parse: parse_age },
    Step { field: Field::Gender, prompt: "Your gender: MALE or FEMALE?", parse: parse_gender },
    Step { field: Field::Seeking, prompt: "Who would you like to meet: MALE, FEMALE or ANY?", parse: parse_seeking },
    Step { field: Field::City, prompt: "Which city are you in? Send \"-\" to skip.", parse: parse_city },
    Step { field: Field::Description, prompt: "Tell us about yourself (at least 10 characters).", parse: parse_description },
    Step { field: Field::Photo, prompt: "Send a photo.", parse: parse_photo },
    Step { field: Field::Interests, prompt: "Pick up to 5 interest ids, separated by commas. Send \"-\" to skip.", parse: parse_interests },
];

fn step_index(field: Field) -> usize {
    STEPS.iter().position(|step| step.field == field).unwrap_or(0)
}

fn parse_name(input: &str, draft: &mut ProfileDraft) -> Result<(), String> {
    profile::check_name(input)?;
    draft.name = Some(input.trim().to_string());
    Ok(())
}

fn parse_age(input: &str, draft: &mut ProfileDraft) -> Result<(), String> {
    let age: i32 = input.trim().parse().map_err(|_| "age must be a number".to_string())?;
    profile::check_age(age)?;
    draft.age = Some(age);
    Ok(())
}

fn parse_gender(input: &str, draft: &mut ProfileDraft) -> Result<(), String> {
    let gender = input.parse::<Gender>().map_err(|_| "please answer MALE or FEMALE".to_string())?;
    draft.gender = Some(gender);
    Ok(())
}

fn parse_seeking(input: &str, draft: &mut ProfileDraft) -> Result<(), String> {
    let seeking = input
        .parse::<Seeking>()
        .map_err(|_| "please answer MALE, FEMALE or ANY".to_string())?;
    draft.seeking = Some(seeking);
    Ok(())
}

fn parse_city(input: &str, draft: &mut ProfileDraft) -> Result<(), String> {
    let input = input.trim();
    if input == "-" {
        draft.city = None;
        return Ok(());
    }
    profile::check_city(input)?;
    draft.city = profile::normalize_city(input);
    Ok(())
}

fn parse_description(input: &str, draft: &mut ProfileDraft) -> Result<(), String> {
    profile::check_description(input)?;
    draft.description = Some(input.trim().to_string());
    Ok(())
}

fn parse_photo(input: &str, draft: &mut ProfileDraft) -> Result<(), String> {
    profile::check_photo(input)?;
    draft.photo = Some(input.trim().to_string());
    Ok(())
}

fn parse_interests(input: &str, draft: &mut ProfileDraft) -> Result<(), String> {
    let input = input.trim();
    let mut ids: Vec<InterestId> = Vec::new();
    if !input.is_empty() && input != "-" {
        for token in input.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty()) {
            let id = token
                .parse::<InterestId>()
                .map_err(|_| format!("\"{token}\" is not an interest id"))?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    if ids.len() > MAX_INTERESTS {
        return Err(format!("choose at most {MAX_INTERESTS} interests"));
    }
    draft.interests = ids;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "field", rename_all = "snake_case")]
enum Mode {
    Create,
    Edit(Field),
}

/// Result of the dialogue once every step of the entry configuration is done.
#[derive(Debug, Clone, PartialEq)]
pub enum Completed {
    Profile { submission: ProfileSubmission, interests: Vec<InterestId> },
    Changes(ProfileChanges),
    Interests(Vec<InterestId>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Input accepted; ask the next question.
    Prompt(&'static str),
    /// Input rejected; ask the same question again.
    Retry { message: String, prompt: &'static str },
    Complete(Completed),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wizard {
    mode: Mode,
    position: usize,
    draft: ProfileDraft,
}

impl Wizard {
    pub fn create() -> Self {
        Self { mode: Mode::Create, position: 0, draft: ProfileDraft::default() }
    }

    pub fn edit(field: Field) -> Self {
        Self { mode: Mode::Edit(field), position: step_index(field), draft: ProfileDraft::default() }
    }

    fn step(&self) -> &'static Step {
        &STEPS[self.position.min(STEPS.len() - 1)]
    }

    pub fn field(&self) -> Field {
        self.step().field
    }

    pub fn prompt(&self) -> &'static str {
        self.step().prompt
    }

    pub fn draft(&self) -> &ProfileDraft {
        &self.draft
    }

    pub fn advance(&mut self, input: &str) -> Outcome {
        let step = self.step();
        if let Err(message) = (step.parse)(input, &mut self.draft) {
            return Outcome::Retry { message, prompt: step.prompt };
        }

        match self.mode {
            Mode::Edit(Field::Interests) => {
                Outcome::Complete(Completed::Interests(self.draft.interests.clone()))
            }
            Mode::Edit(field) => Outcome::Complete(Completed::Changes(self.draft.clone().changes_for(field))),
            Mode::Create if self.position + 1 < STEPS.len() => {
                self.position += 1;
                Outcome::Prompt(self.prompt())
            }
            Mode::Create => match self.draft.clone().into_submission() {
                Some(submission) => Outcome::Complete(Completed::Profile {
                    submission,
                    interests: self.draft.interests.clone(),
                }),
                None => {
                    self.position = 0;
                    Outcome::Retry {
                        message: "some answers are missing, let's start over".to_string(),
                        prompt: self.prompt(),
                    }
                }
            },
        }
    }
}
