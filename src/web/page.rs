use minijinja::{context, Environment};
use serde::Serialize;

use crate::assistant::AskOutcome;
use crate::catalog::Catalog;
use crate::error::FaqError;
use crate::render::{result_fields, sufficiency_label};

const INDEX_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{ catalog.title }}</title>
  <style>
    body { font-family: sans-serif; max-width: 860px; margin: 2rem auto; padding: 0 1rem; }
    .error { border: 1px solid #c0392b; background: #fdecea; padding: .75rem; }
    .result { border-top: 1px solid #ddd; padding: .5rem 0; }
    .meta { color: #666; font-size: .9rem; }
    pre { white-space: pre-wrap; }
  </style>
</head>
<body>
  <h1>{{ catalog.title }}</h1>
  <p>{{ catalog.description }}</p>

  <form method="get" action="/search">
    <input type="text" name="question" value="{{ form.question }}" placeholder="{{ catalog.placeholder }}" size="60">
    <select name="category">
      {% for option in categories %}
      <option value="{{ option }}"{% if option == form.category %} selected{% endif %}>{{ option }}</option>
      {% endfor %}
    </select>
    <label><input type="checkbox" name="use_date_filter"{% if form.use_date_filter %} checked{% endif %}> Filter by date</label>
    <input type="date" name="start_date" value="{{ form.start_date }}">
    <input type="date" name="end_date" value="{{ form.end_date }}">
    <button type="submit">Search</button>
  </form>

  <p>Examples:
  {% for example in catalog.examples %}
    <a href="/search?question={{ example|urlencode }}"><button type="button">{{ example }}</button></a>
  {% endfor %}
  </p>

  {% if error %}
  <div class="error"><strong>Error ({{ error.stage }}):</strong> {{ error.message }}</div>
  {% endif %}

  {% if answer %}
  <h2>Answer</h2>
  <p>{{ answer.answer }}</p>
  <h3>Thought Process</h3>
  <ul>
    {% for thought in answer.thought_process %}<li>{{ thought }}</li>{% endfor %}
  </ul>
  <p><strong>Context Sufficiency:</strong> {{ answer.sufficiency }}</p>

  <h3>Raw Search Results</h3>
  {% for row in results %}
  <div class="result">
    <div class="meta">#{{ row.rank }} | Category: {{ row.category }} | Created: {{ row.created }} | Similarity: {{ row.similarity }}</div>
    <pre>{{ row.content }}</pre>
  </div>
  {% else %}
  <p>No matching entries.</p>
  {% endfor %}
  {% endif %}
</body>
</html>
"#;

/// Values echoed back into the search form.
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub question: String,
    pub category: String,
    pub use_date_filter: bool,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Serialize)]
struct AnswerView<'a> {
    answer: &'a str,
    thought_process: &'a [String],
    sufficiency: &'static str,
}

#[derive(Debug, Serialize)]
struct ResultView<'a> {
    rank: usize,
    category: String,
    created: String,
    similarity: String,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ErrorView {
    stage: &'static str,
    message: String,
}

/// Compiled page templates. HTML autoescaping applies to every `.html` template.
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, FaqError> {
        let mut env = Environment::new();
        env.add_template("index.html", INDEX_TEMPLATE)
            .map_err(|e| FaqError::Configuration(format!("invalid page template: {}", e)))?;
        Ok(Self { env })
    }

    /// Render the page. With neither an outcome nor an error this is the empty form.
    pub fn render(
        &self,
        catalog: &Catalog,
        form: &FormView,
        outcome: Option<&AskOutcome>,
        error: Option<&FaqError>,
    ) -> Result<String, FaqError> {
        let answer = outcome.map(|o| AnswerView {
            answer: &o.answer.answer,
            thought_process: &o.answer.thought_process,
            sufficiency: sufficiency_label(o.answer.enough_context),
        });
        let results: Vec<ResultView<'_>> = outcome
            .map(|o| {
                o.results
                    .iter()
                    .enumerate()
                    .map(|(i, row)| {
                        let (category, created) = result_fields(row);
                        ResultView {
                            rank: i + 1,
                            category,
                            created,
                            similarity: format!("{:.2}", row.similarity()),
                            content: row.content.trim(),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
        let error = error.map(|e| ErrorView {
            stage: e.stage(),
            message: e.to_string(),
        });

        self.env
            .get_template("index.html")
            .and_then(|tmpl| {
                tmpl.render(context! {
                    catalog => catalog,
                    categories => catalog.selector_options(),
                    form => form,
                    answer => answer,
                    results => results,
                    error => error,
                })
            })
            .map_err(|e| FaqError::Configuration(format!("page render failed: {}", e)))
    }
}
