//! Canned Arabic research report body.
//!
//! The text is fixed; only the title is interpolated. `{title}` is the single
//! placeholder in `SECTION_TEMPLATE`.

pub const DEFAULT_SECTIONS: usize = 5;

const SECTION_TEMPLATE: &str = "\
مقدمة:
يهدف هذا البحث إلى دراسة موضوع ({title}) دراسة علمية أكاديمية وفق المنهج العلمي المعتمد في البحوث الجامعية.

مشكلة البحث:
تتمحور مشكلة البحث حول تحليل أبعاد موضوع ({title}) بشكل منهجي.

أهمية البحث:
تكمن أهمية البحث في كونه يعالج موضوعاً معاصراً له قيمة علمية.

أهداف البحث:
1- توضيح المفاهيم الأساسية
2- تحليل الإطار النظري
3- تقديم نتائج وتوصيات

الإطار النظري:
يتناول هذا الفصل المفاهيم والنظريات المرتبطة بموضوع البحث.

الدراسات السابقة:
استعراض الدراسات السابقة ذات العلاقة.

المنهجية:
اعتمد البحث المنهج الوصفي التحليلي.

الخاتمة:
توصل البحث إلى نتائج مهمة مع توصيات مستقبلية.";

/// Builds the report body for `title`, repeating the section block `sections` times.
pub fn research_text(title: &str, sections: usize) -> String {
    let section = SECTION_TEMPLATE.replace("{title}", title.trim());
    let mut text = String::with_capacity((section.len() + 2) * sections);
    for _ in 0..sections {
        text.push_str(&section);
        text.push_str("\n\n");
    }
    text
}
