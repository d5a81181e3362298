/// Нативный поток анализатора: блоки `словоформа\tразбор\tвес`.
pub mod hfst;

/// Поток дизамбигуатора (CG3): когорты с табуляцией вложенности.
pub mod cg3;
