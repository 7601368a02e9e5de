// Fixed reply texts (Persian, matching the operator's locale)

pub const ACCESS_DENIED: &str = "این ربات تک‌کاربره است. دسترسی ندارید.";

pub const GREETING: &str = "سلام — ربات آماده است. برای ثبت پروژه /newproject را بزن.";

pub const PHOTO_SAVED: &str =
    "عکس دریافت شد و ذخیره موقت شد. اگر می‌خواهی این پروژه را ثبت کنی از /newproject استفاده کن.";

pub const PHOTO_FAILED: &str = "خطا در دریافت عکس. لطفا دوباره امتحان کن.";

pub const GENERIC_ERROR: &str = "خطایی رخ داد. لطفا دوباره امتحان کن.";

pub const NEW_PROJECT_USAGE: &str = "برای ساخت پروژه نام آن را هم بنویس: /newproject نام پروژه";

pub const PROJECT_NAME_TOO_LONG: &str = "نام پروژه نباید بیشتر از ۱۰۰ کاراکتر باشد.";

pub const UNKNOWN_COMMAND: &str = "دستور ناشناخته. دستورهای موجود: /start /status /newproject";

pub fn project_created(name: &str) -> String {
    format!("پروژه «{}» ساخته شد.", name)
}

pub fn status(bot_username: &str, caller: i64) -> String {
    format!("Bot: {}\nUserId: {}", bot_username, caller)
}
