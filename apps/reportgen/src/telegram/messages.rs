// User-facing chat messages.

pub const WELCOME: &str = "📘 بوت بحوث التخرج

أرسل عنوان البحث فقط.
سيتم إنشاء بحث جاهز مع:
• رأس جامعة
• تنسيق رسمي
• ترقيم صفحات";

pub const PROGRESS: &str = "⏳ جاري إنشاء البحث بالتنسيق الجامعي الرسمي...";

pub const DOCUMENT_CAPTION: &str = "✅ بحث تخرج رسمي مع ترقيم صفحات";

pub const FAILURE: &str = "❌ تعذر إنشاء البحث، يرجى المحاولة مرة أخرى لاحقاً.";
