pub mod repository;

use repository::log_event_internal;

/// Запись бизнес-события в журнал `system_log`
///
/// # Примеры
/// ```ignore
/// logger::log("numbering", "Выдан номер SD-20240004");
/// logger::log("startup", "Сервер запущен");
/// ```
pub fn log(category: &str, message: &str) {
    log_event_internal("server", category, message);
}
