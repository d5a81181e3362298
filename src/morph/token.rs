use std::collections::BTreeSet;

use itertools::Itertools;
use serde::Serialize;

use crate::morph::reading::{Analysis, UNKNOWN_MARKER};

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Когорта: словоформа вместе со всеми её кандидатами-чтениями.
///
/// `readings` и `removed_readings` разбивают исходный набор кандидатов:
/// проход дизамбигуации только переносит чтения из первого во второе
/// и никогда не меняет `orig`.
pub struct Token {
    orig: String,
    readings: Vec<Analysis>,
    removed_readings: Vec<Analysis>,
}

impl Token {
    pub fn new(
        orig: impl Into<String>,
        readings: Vec<Analysis>,
        removed_readings: Vec<Analysis>,
    ) -> Self {
        Self {
            orig: orig.into(),
            readings,
            removed_readings,
        }
    }

    /// Поверхностная словоформа.
    pub fn orig(&self) -> &str {
        &self.orig
    }

    /// Оставленные дизамбигуацией чтения.
    pub fn readings(&self) -> &[Analysis] {
        &self.readings
    }

    /// Чтения, снятые дизамбигуацией; накапливаются между проходами.
    pub fn removed_readings(&self) -> &[Analysis] {
        &self.removed_readings
    }

    /// Леммы оставленных чтений, отсортированные для детерминизма.
    pub fn lemmas(&self) -> BTreeSet<String> {
        self.readings
            .iter()
            .flat_map(|analysis| analysis.lemmas())
            .collect()
    }

    /// Словоформа, которую анализатор не знает.
    pub fn is_unknown(&self) -> bool {
        self.readings.is_empty() && self.removed_readings.is_empty()
    }

    /// Блок токена в нативном потоке анализатора:
    /// по строке `словоформа\tразбор\tвес` на каждое чтение.
    pub fn hfst_stream(&self) -> String {
        if self.is_unknown() {
            return format!("{}\t{}{}\tinf", self.orig, self.orig, UNKNOWN_MARKER);
        }
        self.readings
            .iter()
            .map(|analysis| {
                format!(
                    "{}\t{}\t{}",
                    self.orig,
                    analysis.hfst_str(),
                    analysis.weight_str()
                )
            })
            .join("\n")
    }

    /// Блок токена в CG3-потоке: заголовок `"<словоформа>"` и строки чтений.
    /// Снятые чтения печатаются с префиксом `;` на каждой строке.
    pub fn cg3_str(&self, traces: bool, with_removed: bool) -> String {
        let mut lines = vec![format!("\"<{}>\"", self.orig)];
        for analysis in &self.readings {
            lines.push(analysis.cg3_str(traces));
        }
        if with_removed {
            for analysis in &self.removed_readings {
                let removed = analysis
                    .cg3_str(traces)
                    .lines()
                    .map(|line| format!(";{line}"))
                    .join("\n");
                lines.push(removed);
            }
        }
        lines.join("\n")
    }

    /// Перенос результата дизамбигуации на токен: оставленные чтения
    /// заменяются, снятые добавляются к уже накопленным.
    pub(crate) fn merge(&mut self, new: Token) {
        self.readings = new.readings;
        self.removed_readings.extend(new.removed_readings);
    }
}
