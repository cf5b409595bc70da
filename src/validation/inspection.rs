use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::ValidationErrors;
use crate::database::models::{ChecklistQuestion, InspectionChanges, NewInspection, QuestionKind};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInspectionRequest {
    pub project_id: Option<String>,
    pub checklist_id: Option<String>,
    pub assigned_to: Option<String>,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInspectionRequest {
    pub title: Option<String>,
    pub assigned_to: Option<String>,
    pub responses: Option<Value>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub notes: Option<String>,
    pub due_date: Option<String>,
}

impl CreateInspectionRequest {
    pub fn validate(self, created_by: Uuid) -> Result<NewInspection, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let project_id = errors.uuid("projectId", self.project_id.as_deref(), true);
        let checklist_id = errors.uuid("checklistId", self.checklist_id.as_deref(), true);
        let assigned_to = errors.uuid("assignedTo", self.assigned_to.as_deref(), true);
        let title = errors.text("title", self.title, 1, 200, true);
        let notes = errors.text("notes", self.notes, 0, 5000, false);
        let due_date = errors.date("dueDate", self.due_date.as_deref(), false);

        match (project_id, checklist_id, assigned_to, title) {
            (Some(project_id), Some(checklist_id), Some(assigned_to), Some(title)) => errors.finish(NewInspection {
                project_id,
                checklist_id,
                assigned_to,
                title,
                notes,
                due_date,
                created_by,
            }),
            _ => Err(errors),
        }
    }
}

impl UpdateInspectionRequest {
    /// Responses are checked against the checklist's questions; completeness is
    /// only enforced on submit.
    pub fn validate(self, questions: &[ChecklistQuestion]) -> Result<InspectionChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = match self.title {
            Some(t) => errors.text("title", Some(t), 1, 200, true),
            None => None,
        };
        let assigned_to = errors.uuid("assignedTo", self.assigned_to.as_deref(), false);
        let responses = match self.responses {
            Some(Value::Object(map)) => {
                check_responses(&mut errors, questions, &map, false);
                Some(Value::Object(map))
            }
            Some(_) => {
                errors.add("responses", "responses must be an object keyed by question id");
                None
            }
            None => None,
        };
        let location = errors.geolocation(self.latitude, self.longitude);
        let accuracy = errors.non_negative("accuracy", self.accuracy);
        let notes = errors.text("notes", self.notes, 0, 5000, false);
        let due_date = errors.date("dueDate", self.due_date.as_deref(), false);

        errors.finish(InspectionChanges {
            title,
            assigned_to,
            responses,
            latitude: location.map(|l| l.0),
            longitude: location.map(|l| l.1),
            accuracy,
            notes,
            due_date,
            ..Default::default()
        })
    }
}

/// Submission requires every required question answered with a well-typed value
pub fn validate_submission(questions: &[ChecklistQuestion], responses: &Value) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    match responses {
        Value::Object(map) => check_responses(&mut errors, questions, map, true),
        _ => errors.add("responses", "responses must be an object keyed by question id"),
    }
    errors.finish(())
}

fn check_responses(
    errors: &mut ValidationErrors,
    questions: &[ChecklistQuestion],
    responses: &Map<String, Value>,
    require_complete: bool,
) {
    for key in responses.keys() {
        if !questions.iter().any(|q| &q.id == key) {
            errors.add(&format!("responses.{}", key), "unknown question id");
        }
    }

    for question in questions {
        let field = format!("responses.{}", question.id);
        match responses.get(&question.id) {
            None | Some(Value::Null) => {
                if require_complete && question.required {
                    errors.add(&field, "an answer is required");
                }
            }
            Some(answer) => {
                if let Err(message) = check_answer(question, answer) {
                    errors.add(&field, message);
                }
            }
        }
    }
}

fn check_answer(question: &ChecklistQuestion, answer: &Value) -> Result<(), String> {
    let options = question.options.as_deref().unwrap_or_default();
    match question.kind {
        QuestionKind::Text | QuestionKind::File => match answer {
            Value::String(s) if question.required && s.trim().is_empty() => Err("an answer is required".into()),
            Value::String(s) if s.chars().count() > 10_000 => Err("answer is too long".into()),
            Value::String(_) => Ok(()),
            _ => Err("expected a string".into()),
        },
        QuestionKind::Number => {
            let n = answer.as_f64().ok_or_else(|| "expected a number".to_string())?;
            if question.min.is_some_and(|min| n < min) || question.max.is_some_and(|max| n > max) {
                return Err(format!(
                    "must be between {} and {}",
                    question.min.map(|v| v.to_string()).unwrap_or_else(|| "-inf".into()),
                    question.max.map(|v| v.to_string()).unwrap_or_else(|| "inf".into()),
                ));
            }
            Ok(())
        }
        QuestionKind::Boolean => answer.as_bool().map(|_| ()).ok_or_else(|| "expected true or false".into()),
        QuestionKind::Select => match answer.as_str() {
            Some(choice) if options.iter().any(|o| o == choice) => Ok(()),
            _ => Err(format!("must be one of: {}", options.join(", "))),
        },
        QuestionKind::Multiselect => {
            let choices = answer.as_array().ok_or_else(|| "expected a list of options".to_string())?;
            let valid = choices
                .iter()
                .all(|c| c.as_str().is_some_and(|c| options.iter().any(|o| o == c)));
            if !valid {
                return Err(format!("each choice must be one of: {}", options.join(", ")));
            }
            if question.required && choices.is_empty() {
                return Err("select at least one option".into());
            }
            Ok(())
        }
    }
}
