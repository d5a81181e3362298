use smallstr::SmallString;
use smallvec::SmallVec;

/// Грамматический тег и реестр тегов.
pub mod tag;
/// Чтения: один морфологический разбор словоформы.
pub mod reading;
/// Когорта: словоформа вместе со всеми её чтениями.
pub mod token;

pub mod pretty_display;

use tag::Tag;

// Значения для Small-хранения лемм и тегов одного чтения.
// Нынешние значения вычислены экспериментально и могут меняться при дальнейших экспериментах.

/// Количество тегов, которое вмещает в себя большую часть чтений,
/// чтобы не аллоцировать под небольшой размер данных большое количество места на куче.
pub const SMALLTAG: usize = 8;
/// Количество байт, которое вмещает в себя большую часть лемм,
/// чтобы не аллоцировать под небольшой размер данных большое количество места на куче.
pub const SMALLLEMMA: usize = 16;

/// Лемма (нормальная форма) чтения.
pub type Lemma = SmallString<[u8; SMALLLEMMA]>;
/// Упорядоченный набор тегов одного чтения.
pub type Tags = SmallVec<[&'static Tag; SMALLTAG]>;
