//! Word sets that decide how many leading words form a command key.

/// Verbs that take a noun continuation ("أضف عنوان", "افتح صفحة").
pub const VERBS: &[&str] = &["أضف", "افتح", "أغلق", "أنشئ"];

/// Nouns that complete a verb into a two-word key.
pub const NOUNS: &[&str] = &[
    "صفحة",
    "عنوان",
    "عنوان_فرعي",
    "فقرة",
    "رابط",
    "صورة",
    "عنصر",
    "زر",
    "نص",
    "خط_فاصل",
    "مسافة",
    "مدخل_نص",
    "مدخل_كلمة_سر",
    "مربع_اختيار",
    "صف",
    "خانة",
    "قائمة",
    "قائمة_مرقمة",
    "قسم",
    "جدول",
];

/// Words that open a three-word key when at least three words are present
/// ("غيّر لون_الخلفية إلى").
pub const THREE_WORD_PREFIXES: &[&str] = &["غيّر"];

/// Block control words ("ابدأ قائمة", "أنهِ قسم"). They absorb the next
/// word whatever it is.
pub const BLOCK_CONTROL: &[&str] = &["ابدأ", "أنهِ"];
