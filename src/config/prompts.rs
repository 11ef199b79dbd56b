//! Prompt and message templates for Ganj.
//!
//! Templates can be customized by placing TOML files in the custom prompts directory.
//! Every user-facing string the chat endpoint produces lives here.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid regex"));

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
    pub fallback: FallbackPrompts,
    pub messages: MessagePrompts,
    pub labels: LabelPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for RAG response generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    /// System prompt; `{{context}}` is replaced with the retrieved excerpts.
    pub system: String,
    /// Answer used when the model returns an empty completion.
    pub empty_completion: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: r#"شما دستیار هوشمند "گنج حضور" هستید که توسط پرویز شهبازی اجرا می‌شود. وظیفه شما کمک به کاربران در یافتن و درک محتوای برنامه‌های معنوی و عرفانی است.

از اطلاعات زیر برای پاسخ دادن به سوال کاربر استفاده کنید. اگر پاسخ در متن زیر نیست، صادقانه بگویید که نمی‌دانید و پیشنهاد دهید کاربر جستجوی دیگری انجام دهد.

همیشه منابع خود را ذکر کنید (شماره برنامه).

متن مرجع:
{{context}}"#
                .to_string(),
            empty_completion: "متاسفانه نتوانستم پاسخی تولید کنم.".to_string(),
        }
    }
}

/// Templated answers used when no generated answer is available.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackPrompts {
    /// Nothing relevant was retrieved.
    pub no_results: String,
    /// Relevant programs were found; `{{programs}}` and `{{more}}` are filled in.
    pub programs: String,
    /// Suffix for programs beyond the listed ones; `{{count}}` is filled in.
    pub more_programs: String,
    /// Chunks were found but none carries a program number.
    pub generic: String,
}

impl Default for FallbackPrompts {
    fn default() -> Self {
        Self {
            no_results: "متاسفانه اطلاعات مرتبطی پیدا نکردم. لطفاً سوال خود را به شکل دیگری مطرح کنید یا از شماره برنامه خاصی بپرسید.".to_string(),
            programs: "بر اساس جستجوی شما، اطلاعات مرتبطی در برنامه‌های {{programs}} پیدا کردم. {{more}}\n\nبرای مشاهده متن کامل، می‌توانید به صفحات این برنامه‌ها مراجعه کنید.".to_string(),
            more_programs: "و {{count}} برنامه دیگر.".to_string(),
            generic: "اطلاعات مرتبطی پیدا کردم اما نمی‌توانم پاسخ دقیقی بدهم. لطفاً سوال خود را واضح‌تر مطرح کنید.".to_string(),
        }
    }
}

/// Validation and error messages shown to the end user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagePrompts {
    pub empty_message: String,
    pub message_too_long: String,
    pub processing_error: String,
    pub apology: String,
}

impl Default for MessagePrompts {
    fn default() -> Self {
        Self {
            empty_message: "پیام خالی است. لطفاً سوال خود را وارد کنید.".to_string(),
            message_too_long: "پیام خیلی طولانی است. لطفاً سوال کوتاه‌تری بپرسید.".to_string(),
            processing_error: "خطا در پردازش پیام. لطفاً دوباره تلاش کنید.".to_string(),
            apology: "متاسفانه خطایی رخ داد. لطفاً بعداً تلاش کنید.".to_string(),
        }
    }
}

/// Labels used for chunk titles and context headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelPrompts {
    /// Default title of a numbered program; `{{number}}` is filled in.
    pub program_title: String,
    /// Title of text that belongs to no program.
    pub general_title: String,
    /// Context header for a program chunk; `{{number}}` and `{{title}}` are filled in.
    pub program_header: String,
    /// Context header for a chunk without a program number.
    pub general_header: String,
    /// Separator placed between program numbers in fallback answers.
    pub list_separator: String,
}

impl Default for LabelPrompts {
    fn default() -> Self {
        Self {
            program_title: "برنامه {{number}}".to_string(),
            general_title: "متن عمومی".to_string(),
            program_header: "[برنامه #{{number}}: {{title}}]".to_string(),
            general_header: "[متن عمومی]".to_string(),
            list_separator: "، ".to_string(),
        }
    }
}

impl LabelPrompts {
    /// Default title for a program number.
    pub fn program_title(&self, number: u32) -> String {
        self.program_title.replace("{{number}}", &number.to_string())
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }

            let fallback_path = custom_path.join("fallback.toml");
            if fallback_path.exists() {
                let content = std::fs::read_to_string(&fallback_path)?;
                prompts.fallback = toml::from_str(&content)?;
            }

            let messages_path = custom_path.join("messages.toml");
            if messages_path.exists() {
                let content = std::fs::read_to_string(&messages_path)?;
                prompts.messages = toml::from_str(&content)?;
            }

            let labels_path = custom_path.join("labels.toml");
            if labels_path.exists() {
                let content = std::fs::read_to_string(&labels_path)?;
                prompts.labels = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are replaced in one pass over the template, so text
    /// inserted for one variable is never scanned for others. Unknown
    /// placeholders are left as they are.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        PLACEHOLDER_REGEX
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
