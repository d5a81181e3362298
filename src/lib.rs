pub mod errors;
/// Грамматические структуры русского языка: теги, чтения, когорты.
pub mod morph;
/// Двунаправленный кодек потоков: нативный формат анализатора и формат CG3.
pub mod stream;
/// Последовательность токенов и полный цикл дизамбигуации.
pub mod text;

use errors::RazborResult;

pub use morph::{
    reading::{Analysis, MultiReading, Reading},
    tag::Tag,
    token::Token,
    SMALLLEMMA, SMALLTAG,
};
pub use text::Text;

/// Внешний морфологический анализатор (конечный преобразователь).
///
/// Ядро не управляет процессом анализатора: оно лишь потребляет пары
/// `(нативный разбор, вес)` для каждой словоформы.
pub trait Analyzer {
    /// Все кандидаты-разборы словоформы.
    fn analyze(&self, surface: &str) -> RazborResult<Vec<(String, String)>>;
}

/// Внешний генератор поверхностных форм, обратный анализатору.
pub trait Generator {
    /// Поверхностная форма по нативному разбору;
    /// `None` - такой анализ не порождается лексиконом.
    fn generate(&self, analysis: &str) -> RazborResult<Option<String>>;
}

/// Внешний дизамбигуатор (constraint grammar).
///
/// Принимает и возвращает CG3-поток; снятие чтений кодируется
/// ведущим `;`, след правила - хвостом строки чтения.
pub trait Disambiguator {
    fn disambiguate(&self, cg3_stream: &str) -> RazborResult<String>;
}
