//! Compiled-in string tables, one typed record per [`Locale`].

use crate::locale::Locale;

/// Every translatable slot a page variant may carry.
#[derive(
    Debug,
    Clone,
    Copy,
    Hash,
    PartialEq,
    Eq,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::Display,
    strum::EnumIter,
)]
#[strum(serialize_all = "camelCase")]
pub enum Field {
    Heading,
    BtnText,
    ResearcherTitle,
    ResearcherText,
    ResearcherLinkScholar,
    ResearcherLinkInsta,
    WriterTitle,
    WriterText,
    BloggerTitle,
    BloggerText,
    NameLabel,
    EmailLabel,
    ResearchLabel,
    ScholarLink,
    BackLink,
    BlogHeading,
    BlogIntro,
}

impl Field {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Id of the element that shows this field.
    ///
    /// `ScholarLink` has no element of its own, it only feeds the
    /// `researchLabel` composite.
    pub fn element_id(&self) -> Option<&'static str> {
        match self {
            Field::Heading => Some("mainHeading"),
            Field::BtnText => Some("langBtn"),
            Field::ScholarLink => None,
            other => Some(other.name()),
        }
    }

    /// Fields rendered as label followed by a fixed hyperlink.
    pub fn is_composite(&self) -> bool {
        matches!(self, Field::EmailLabel | Field::ResearchLabel)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TranslationTable {
    pub heading: Option<&'static str>,
    pub btn_text: Option<&'static str>,
    pub researcher_title: Option<&'static str>,
    pub researcher_text: Option<&'static str>,
    pub researcher_link_scholar: Option<&'static str>,
    pub researcher_link_insta: Option<&'static str>,
    pub writer_title: Option<&'static str>,
    pub writer_text: Option<&'static str>,
    pub blogger_title: Option<&'static str>,
    pub blogger_text: Option<&'static str>,
    pub name_label: Option<&'static str>,
    pub email_label: Option<&'static str>,
    pub research_label: Option<&'static str>,
    pub scholar_link: Option<&'static str>,
    pub back_link: Option<&'static str>,
    pub blog_heading: Option<&'static str>,
    pub blog_intro: Option<&'static str>,
}

static ENGLISH: TranslationTable = TranslationTable {
    heading: Some("Love Grover"),
    btn_text: Some("हिन्दी"),

    researcher_title: Some("Researcher"),
    researcher_text: Some("View publications on Google Scholar"),
    researcher_link_scholar: Some("Google Scholar"),
    researcher_link_insta: Some("Instagram"),
    writer_title: Some("Writer"),
    writer_text: Some("Get in touch"),
    blogger_title: Some("Blogger"),
    blogger_text: Some("Read the blog"),

    name_label: Some("Name: Love Grover"),
    email_label: Some("Email: "),
    research_label: Some("Research: "),
    scholar_link: Some("Google Scholar Profile"),
    back_link: Some("← Back to Home"),

    blog_heading: Some("Blog"),
    blog_intro: Some("Notes on research, writing and everything in between."),
};

static HINDI: TranslationTable = TranslationTable {
    heading: Some("लव ग्रोवर"),
    btn_text: Some("English"),

    researcher_title: Some("शोधकर्ता"),
    researcher_text: Some("गूगल स्कॉलर पर प्रकाशन देखें"),
    researcher_link_scholar: Some("गूगल स्कॉलर"),
    researcher_link_insta: Some("इंस्टाग्राम"),
    writer_title: Some("लेखक"),
    writer_text: Some("संपर्क करें"),
    blogger_title: Some("ब्लॉगर"),
    blogger_text: Some("ब्लॉग पढ़ें"),

    name_label: Some("नाम: लव ग्रोवर"),
    email_label: Some("ईमेल: "),
    research_label: Some("शोध: "),
    scholar_link: Some("गूगल स्कॉलर प्रोफ़ाइल"),
    back_link: Some("← होम पर वापस जाएं"),

    blog_heading: Some("ब्लॉग"),
    blog_intro: Some("शोध, लेखन और उनके बीच की हर चीज़ पर टिप्पणियाँ।"),
};

impl TranslationTable {
    pub fn for_locale(locale: Locale) -> &'static TranslationTable {
        match locale {
            Locale::English => &ENGLISH,
            Locale::Hindi => &HINDI,
        }
    }

    /// Empty strings count as missing.
    pub fn get(&self, field: Field) -> Option<&'static str> {
        let value = match field {
            Field::Heading => self.heading,
            Field::BtnText => self.btn_text,
            Field::ResearcherTitle => self.researcher_title,
            Field::ResearcherText => self.researcher_text,
            Field::ResearcherLinkScholar => self.researcher_link_scholar,
            Field::ResearcherLinkInsta => self.researcher_link_insta,
            Field::WriterTitle => self.writer_title,
            Field::WriterText => self.writer_text,
            Field::BloggerTitle => self.blogger_title,
            Field::BloggerText => self.blogger_text,
            Field::NameLabel => self.name_label,
            Field::EmailLabel => self.email_label,
            Field::ResearchLabel => self.research_label,
            Field::ScholarLink => self.scholar_link,
            Field::BackLink => self.back_link,
            Field::BlogHeading => self.blog_heading,
            Field::BlogIntro => self.blog_intro,
        };
        value.filter(|text| !text.is_empty())
    }
}

/// Label text immediately followed by a fixed anchor.
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct LabelledLink<'a> {
    pub label: &'a str,
    pub href: &'a str,
    pub text: &'a str,
    pub new_tab: bool,
}

impl LabelledLink<'_> {
    pub fn to_html(&self) -> String {
        let target = if self.new_tab { r#" target="_blank""# } else { "" };
        format!(
            r#"{}<a href="{}"{}>{}</a>"#,
            escape_text(self.label),
            escape_attr(self.href),
            target,
            escape_text(self.text)
        )
    }
}

pub fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_attr(raw: &str) -> String {
    escape_text(raw).replace('"', "&quot;")
}
