//! Prompt text sent to the model.
//!
//! Each prompt embeds the raw text between triple quotes, lists the
//! category table and pins the JSON keys that [`Summary`](crate::models::Summary)
//! deserializes. Feed posts and search articles get different analyst
//! instructions; the task prompt only depends on the output language.

use crate::models::{Language, Origin};

const FEED_INSTRUCTION: &str = "You are a professional content analyst creating strategic summaries for startup accelerators and venture capital firms. \
Your role is to extract and communicate key developments from startup updates, focusing only on strategically significant news \
such as funding, major partnerships, product launches, or industry recognition. \
Classify the type of announcement for internal analytics. Use a professional, concise, and insight-driven tone tailored to stakeholders and investors. \
Always evaluate whether the content reflects a meaningful business milestone. If it does not, classify it as 'None'. \
Routine updates or internal reflections should not be treated as news and should be classified as 'None'.";

const NEWS_INSTRUCTION: &str = "You are a news content writer creating search-optimized press summaries for a startup accelerator. \
Your goal is to write accurate, concise, and engaging headlines and summaries suitable for news aggregators. \
Only write about announcements that are newsworthy, such as funding, major partnerships, product launches, or awards. \
Routine updates, internal reflections, error messages or pages without an article should be classified as 'None'. \
Maintain a clear, journalistic tone and ensure the output is structured for automated indexing.";

const CATEGORY_TABLE: &str = "Valid categories:
  - Fund-raised: Mentions of investment or funding rounds.
  - Business Collaboration: Major partnerships or collaborations.
  - Product-launched: Significant new product or feature releases.
  - Awards: Recognition from reputable organizations or competitions.
  - Activities: Major company events or milestone initiatives that reflect growth or traction.
  - None: For routine updates, internal stories, or content not strategically relevant.";

fn instruction(origin: Origin) -> &'static str {
    match origin {
        Origin::Feed => FEED_INSTRUCTION,
        Origin::WebSearch => NEWS_INSTRUCTION,
    }
}

fn english_task(article: &str) -> String {
    format!(
        r#""""
{article}
"""

Based on the above content, perform the following tasks:
1. Headline: Write a compelling LinkedIn post title in the third person.
2. Content: Write a LinkedIn post in the third person, limited to 130 words, using a professional and engaging tone.
3. Category Classification: Only assign a category if the content is genuinely newsworthy. Otherwise, assign "None".
{CATEGORY_TABLE}

Return the output strictly in the following JSON format:
{{
  "Headline": "{{Headline}}",
  "Content": "{{Content}}",
  "Category": "{{Category}}"
}}"#
    )
}

fn bilingual_task(article: &str) -> String {
    format!(
        r#""""
{article}
"""

You are a professional social media strategist working for a startup accelerator. Based on the above content, perform the following tasks:

1. **English Headline**: Write a compelling LinkedIn post title in the third person.
2. **English Content**: Write a LinkedIn post in the third person, limited to 130 words, using a professional and engaging tone.
3. **繁體中文標題**：以第三人稱撰寫一則 LinkedIn 社群貼文標題。
4. **繁體中文內容**：以第三人稱撰寫一則 LinkedIn 社群貼文內容，語氣專業且具吸引力。
5. **Category Classification**: Only classify the announcement into one of the following categories **if it is strategically important for an accelerator to promote**. Otherwise, assign "None".

{CATEGORY_TABLE}

Return the output strictly in the following JSON format:
{{
  "Headline": "{{Headline}}",
  "Content": "{{Content}}",
  "Headline-zh-tw": "{{Headline-zh-tw}}",
  "Content-zh-tw": "{{Content-zh-tw}}",
  "Category": "{{Category}}"
}}"#
    )
}

/// Full prompt for `text`: analyst instruction followed by the task.
pub fn prepare_prompt(text: &str, language: Language, origin: Origin) -> String {
    let task = match language {
        Language::En => english_task(text),
        Language::Ch => bilingual_task(text),
    };
    format!("{}\n\n{}", instruction(origin), task)
}
