//! Markup for the registered-students list.

use shared::domain::StudentRecord;

pub const EMPTY_PLACEHOLDER: &str = r#"<li class="small">No students registered yet.</li>"#;

const MISSING: &str = "N/A";
const NO_COURSES: &str = "—";

/// Escapes text so it can be placed inside element content or a quoted
/// attribute without being read as markup.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Rebuilds the whole list from `students`. Each row's remove control carries
/// the record's stable id as well as its position in this render.
pub fn render_students(students: &[StudentRecord]) -> String {
    if students.is_empty() {
        return EMPTY_PLACEHOLDER.to_string();
    }

    students
        .iter()
        .enumerate()
        .map(|(position, student)| render_row(position, student))
        .collect()
}

fn render_row(position: usize, student: &StudentRecord) -> String {
    let courses = if student.courses.is_empty() {
        NO_COURSES.to_string()
    } else {
        escape_html(&student.courses.join(", "))
    };

    format!(
        r#"<li data-id="{id}">
  <div>
    <div><strong>{name}</strong> <span class="small">({email})</span></div>
    <div class="small">{gender} • Age: {age} • Courses: {courses}</div>
  </div>
  <div>
    <button class="removeBtn" data-id="{id}" data-idx="{position}">Remove</button>
  </div>
</li>
"#,
        id = student.id,
        name = escape_html(&student.name),
        email = escape_html(&student.email),
        gender = optional(student.gender.as_deref()),
        age = optional(student.age.as_deref()),
    )
}

fn optional(value: Option<&str>) -> String {
    value
        .filter(|value| !value.is_empty())
        .map_or_else(|| MISSING.to_string(), escape_html)
}
