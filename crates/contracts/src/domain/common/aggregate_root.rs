use crate::shared::numbering::DocumentSeries;

/// Трейт для корня агрегата
///
/// Определяет системное имя агрегата и серии нумерации его документов.
pub trait AggregateRoot {
    /// Индекс агрегата в системе (например, "a001")
    fn aggregate_index() -> &'static str;

    /// Имя коллекции для БД (например, "survey")
    fn collection_name() -> &'static str;

    /// Серии нумерации, из которых агрегат получает `code`
    fn numbering_series() -> &'static [DocumentSeries];

    /// Полное имя агрегата для системы (например, "a001_survey")
    fn full_name() -> String {
        format!("{}_{}", Self::aggregate_index(), Self::collection_name())
    }
}
