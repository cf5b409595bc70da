use std::collections::HashSet;

use serde::Deserialize;
use uuid::Uuid;

use super::ValidationErrors;
use crate::database::models::{ChecklistChanges, ChecklistQuestion, NewChecklist, QuestionKind};

pub const MAX_QUESTIONS: usize = 100;
pub const MAX_OPTIONS: usize = 50;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    pub id: Option<String>,
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub required: Option<bool>,
    pub options: Option<Vec<String>>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChecklistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub questions: Option<Vec<QuestionInput>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChecklistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub questions: Option<Vec<QuestionInput>>,
    pub is_active: Option<bool>,
}

impl CreateChecklistRequest {
    pub fn validate(self, project_id: Uuid, created_by: Uuid) -> Result<NewChecklist, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = errors.text("name", self.name, 1, 200, true);
        let description = errors.text("description", self.description, 0, 2000, false);
        let questions = match errors.required("questions", self.questions) {
            Some(q) => questions(&mut errors, q),
            None => None,
        };

        match (name, questions) {
            (Some(name), Some(questions)) => errors.finish(NewChecklist {
                project_id,
                name,
                description,
                questions,
                is_active: self.is_active.unwrap_or(true),
                created_by,
            }),
            _ => Err(errors),
        }
    }
}

impl UpdateChecklistRequest {
    pub fn validate(self) -> Result<ChecklistChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = match self.name {
            Some(n) => errors.text("name", Some(n), 1, 200, true),
            None => None,
        };
        let description = errors.text("description", self.description, 0, 2000, false);
        let questions = match self.questions {
            Some(q) => questions(&mut errors, q),
            None => None,
        };

        errors.finish(ChecklistChanges {
            name,
            description,
            questions,
            is_active: self.is_active,
        })
    }
}

fn questions(errors: &mut ValidationErrors, input: Vec<QuestionInput>) -> Option<Vec<ChecklistQuestion>> {
    if input.is_empty() {
        errors.add("questions", "A checklist needs at least one question");
        return None;
    }
    if input.len() > MAX_QUESTIONS {
        errors.add(
            "questions",
            format!("A checklist can have at most {} questions", MAX_QUESTIONS),
        );
        return None;
    }

    let before = errors.errors().len();
    let mut ids = HashSet::new();
    let mut out = Vec::with_capacity(input.len());

    for (i, q) in input.into_iter().enumerate() {
        let prefix = format!("questions[{}]", i);

        let id = errors.text(&format!("{}.id", prefix), q.id, 1, 64, true);
        if let Some(id) = &id {
            if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
                errors.add(
                    &format!("{}.id", prefix),
                    "question id may only contain letters, digits, hyphens and underscores",
                );
            } else if !ids.insert(id.clone()) {
                errors.add(&format!("{}.id", prefix), format!("duplicate question id '{}'", id));
            }
        }

        let label = errors.text(&format!("{}.label", prefix), q.label, 1, 500, true);

        let kind = match q.kind.as_deref() {
            None => {
                errors.add(&format!("{}.type", prefix), "type is required");
                None
            }
            Some(raw) => {
                let kind = QuestionKind::parse(raw);
                if kind.is_none() {
                    let allowed: Vec<&str> = QuestionKind::ALL.iter().map(|k| k.as_str()).collect();
                    errors.add(
                        &format!("{}.type", prefix),
                        format!("type must be one of: {}", allowed.join(", ")),
                    );
                }
                kind
            }
        };

        let options = kind.and_then(|k| question_options(errors, &prefix, k, q.options));

        if let Some(kind) = kind {
            if kind != QuestionKind::Number && (q.min.is_some() || q.max.is_some()) {
                errors.add(&format!("{}.min", prefix), "min/max only apply to number questions");
            }
            if let (Some(min), Some(max)) = (q.min, q.max) {
                if min > max {
                    errors.add(&format!("{}.max", prefix), "max must be greater than or equal to min");
                }
            }
        }

        if let (Some(id), Some(label), Some(kind)) = (id, label, kind) {
            out.push(ChecklistQuestion {
                id,
                label,
                kind,
                required: q.required.unwrap_or(false),
                options,
                min: q.min,
                max: q.max,
            });
        }
    }

    (errors.errors().len() == before).then_some(out)
}

fn question_options(
    errors: &mut ValidationErrors,
    prefix: &str,
    kind: QuestionKind,
    options: Option<Vec<String>>,
) -> Option<Vec<String>> {
    let field = format!("{}.options", prefix);
    if !kind.has_options() {
        if options.as_ref().is_some_and(|o| !o.is_empty()) {
            errors.add(&field, format!("{} questions do not take options", kind.as_str()));
        }
        return None;
    }

    let options: Vec<String> = options
        .unwrap_or_default()
        .into_iter()
        .map(|o| o.trim().to_string())
        .collect();
    if options.is_empty() {
        errors.add(&field, format!("{} questions need at least one option", kind.as_str()));
        return None;
    }
    if options.len() > MAX_OPTIONS {
        errors.add(&field, format!("at most {} options are allowed", MAX_OPTIONS));
        return None;
    }
    let mut seen = HashSet::new();
    for option in &options {
        if option.is_empty() || option.chars().count() > 200 {
            errors.add(&field, "options must be between 1 and 200 characters");
            return None;
        }
        if !seen.insert(option.as_str()) {
            errors.add(&field, format!("duplicate option '{}'", option));
            return None;
        }
    }
    Some(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, kind: &str) -> QuestionInput {
        QuestionInput {
            id: Some(id.into()),
            label: Some(format!("Question {}", id)),
            kind: Some(kind.into()),
            required: Some(true),
            ..Default::default()
        }
    }

    #[test]
    fn valid_checklist() {
        let mut select = question("surface", "select");
        select.options = Some(vec!["good".into(), "cracked".into()]);
        let mut number = question("depth", "number");
        number.min = Some(0.0);
        number.max = Some(10.0);

        let req = CreateChecklistRequest {
            name: Some("Deck survey".into()),
            questions: Some(vec![question("notes", "text"), select, number, question("photo", "file")]),
            ..Default::default()
        };
        let checklist = req.validate(Uuid::new_v4(), Uuid::new_v4()).unwrap();
        assert_eq!(checklist.questions.len(), 4);
        assert!(checklist.is_active);
        assert_eq!(checklist.questions[1].options.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn select_without_options_rejected() {
        let req = CreateChecklistRequest {
            name: Some("Deck".into()),
            questions: Some(vec![question("q1", "multiselect")]),
            ..Default::default()
        };
        let errors = req.validate(Uuid::new_v4(), Uuid::new_v4()).unwrap_err();
        assert!(errors.has("questions[0].options"));
    }

    #[test]
    fn options_on_text_question_rejected() {
        let mut q = question("q1", "text");
        q.options = Some(vec!["a".into()]);
        let errors = UpdateChecklistRequest {
            questions: Some(vec![q]),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(errors.has("questions[0].options"));
    }

    #[test]
    fn duplicate_ids_and_bad_type_reported_together() {
        let req = CreateChecklistRequest {
            name: Some("Deck".into()),
            questions: Some(vec![question("q1", "text"), question("q1", "text"), question("q3", "slider")]),
            ..Default::default()
        };
        let errors = req.validate(Uuid::new_v4(), Uuid::new_v4()).unwrap_err();
        assert!(errors.has("questions[1].id"));
        assert!(errors.has("questions[2].type"));
    }

    #[test]
    fn empty_question_list_rejected() {
        let req = CreateChecklistRequest {
            name: Some("Deck".into()),
            questions: Some(vec![]),
            ..Default::default()
        };
        assert!(req.validate(Uuid::new_v4(), Uuid::new_v4()).unwrap_err().has("questions"));
    }

    #[test]
    fn min_greater_than_max_rejected() {
        let mut q = question("depth", "number");
        q.min = Some(5.0);
        q.max = Some(1.0);
        let errors = UpdateChecklistRequest {
            questions: Some(vec![q]),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(errors.has("questions[0].max"));
    }

    #[test]
    fn update_without_questions_keeps_version_fields_empty() {
        let changes = UpdateChecklistRequest {
            is_active: Some(false),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert!(changes.questions.is_none());
        assert_eq!(changes.is_active, Some(false));
    }
}
