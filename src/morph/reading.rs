use std::cmp::Ordering;

use itertools::Itertools;
use serde::{Serialize, Serializer};

use crate::{
    errors::{ParseErr, RazborResult, TagErr},
    morph::{
        tag::{is_tag_or_alias, Tag, TagSet},
        Lemma, Tags,
    },
    Generator,
};

/// Разделитель под-чтений составного разбора (слитные формы вида "полчаса").
pub const COMPOUND_SEP: char = '#';
/// Маркер неизвестного анализа в выдаче анализатора.
pub const UNKNOWN_MARKER: &str = "+?";

/// Допуск при сравнении весов двух чтений.
const WEIGHT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Serialize)]
/// Один морфологический разбор словоформы: лемма, упорядоченные теги, вес,
/// и (после дизамбигуации с трассировкой) след правила CG3.
///
/// Порядок тегов значим и сохраняется при сериализации;
/// `tagset` - производное множество для проверок вхождения.
pub struct Reading {
    lemma: Lemma,
    #[serde(serialize_with = "serialize_tags")]
    tags: Tags,
    #[serde(skip)]
    tagset: TagSet,
    #[serde(skip)]
    l2_tags: Tags,
    weight: String,
    cg_rule: Option<String>,
}

fn serialize_tags<S: Serializer>(tags: &Tags, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(tags.iter().map(|tag| tag.name()))
}

impl Reading {
    /// Сборка чтения из нативной формы анализатора `ЛЕММА+ТЕГ+ТЕГ+...`.
    ///
    /// Разделителем служит одиночный `+`: удвоенный `++` является
    /// литеральным плюсом леммы или имени тега.
    pub(crate) fn from_raw(raw: &str, weight: &str, cg_rule: Option<&str>) -> Result<Self, TagErr> {
        let mut parts = split_single_plus(raw).into_iter();
        // Первая часть есть всегда, даже для пустой строки.
        let lemma = parts.next().unwrap_or_default();

        let mut tags = Tags::new();
        for name in parts {
            tags.push(Tag::resolve(name)?);
        }

        let mut reading = Self {
            lemma: Lemma::from_str(lemma),
            tags,
            tagset: TagSet::new(),
            l2_tags: Tags::new(),
            weight: weight.to_string(),
            cg_rule: cg_rule.map(|rule| rule.to_string()),
        };
        reading.rebuild_derived();
        Ok(reading)
    }

    fn rebuild_derived(&mut self) {
        self.tagset = self.tags.iter().copied().collect();
        self.l2_tags = self.tags.iter().filter(|tag| tag.is_l2()).copied().collect();
    }

    pub fn lemma(&self) -> &str {
        self.lemma.as_str()
    }

    pub fn tags(&self) -> &[&'static Tag] {
        &self.tags
    }

    pub fn tagset(&self) -> &TagSet {
        &self.tagset
    }

    /// Теги ошибок изучающих язык среди тегов чтения.
    pub fn l2_tags(&self) -> &[&'static Tag] {
        &self.l2_tags
    }

    /// Вес в исходной текстовой точности.
    pub fn weight_str(&self) -> &str {
        &self.weight
    }

    /// Вес как число. Валидируется при сборке чтения.
    pub fn weight_value(&self) -> f64 {
        self.weight.parse().unwrap_or(f64::INFINITY)
    }

    pub fn cg_rule(&self) -> Option<&str> {
        self.cg_rule.as_deref()
    }

    /// Вхождение леммы, тега или его альтернативы в чтение.
    pub fn contains(&self, key: &str) -> bool {
        key == self.lemma() || is_tag_or_alias(key, &self.tagset)
    }

    /// Нативная форма анализатора: `лемма+Тег+Тег`.
    pub fn hfst_str(&self) -> String {
        format!(
            "{}+{}",
            self.lemma,
            self.tags.iter().map(|tag| tag.name()).join("+")
        )
    }

    /// Нативная форма без L2-тегов - то, что можно отдавать генератору.
    pub fn hfst_no_l2_str(&self) -> String {
        format!(
            "{}+{}",
            self.lemma,
            self.tags
                .iter()
                .filter(|tag| !tag.is_l2())
                .map(|tag| tag.name())
                .join("+")
        )
    }

    /// Строка чтения в CG3-потоке: `\t"лемма" Тег Тег <W:вес>[ правило]`.
    pub fn cg3_str(&self, traces: bool) -> String {
        let mut line = format!(
            "\t\"{}\" {} <W:{:.6}>",
            self.lemma,
            self.tags.iter().map(|tag| tag.name()).join(" "),
            self.weight_value()
        );
        if traces {
            if let Some(rule) = &self.cg_rule {
                line.push(' ');
                line.push_str(rule);
            }
        }
        line
    }

    /// Замена первого вхождения тега `old` на `new`.
    /// Отсутствие `old` в чтении не является ошибкой.
    pub fn replace_tag(
        &mut self,
        old: impl AsRef<str>,
        new: impl AsRef<str>,
    ) -> Result<(), TagErr> {
        let old = Tag::resolve(old.as_ref())?;
        let new = Tag::resolve(new.as_ref())?;
        if let Some(position) = self.tags.iter().position(|tag| *tag == old) {
            self.tags[position] = new;
            self.rebuild_derived();
        }
        Ok(())
    }
}

impl PartialEq for Reading {
    /// Совпадение леммы, последовательности тегов, веса (с допуском) и правила.
    fn eq(&self, other: &Self) -> bool {
        self.lemma == other.lemma
            && self.tags == other.tags
            && (self.weight == other.weight
                || (self.weight_value() - other.weight_value()).abs() <= WEIGHT_TOLERANCE)
            && self.cg_rule == other.cg_rule
    }
}

impl Eq for Reading {}

impl Ord for Reading {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lemma
            .cmp(&other.lemma)
            .then_with(|| self.tags.cmp(&other.tags))
            .then_with(|| self.weight_value().total_cmp(&other.weight_value()))
            .then_with(|| self.cg_rule.cmp(&other.cg_rule))
    }
}

impl PartialOrd for Reading {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Serialize)]
/// Составной разбор словоформы: несколько слитых лемм
/// (числительное с существительным и подобные формы).
pub struct MultiReading {
    readings: Vec<Analysis>,
    weight: String,
    cg_rule: Option<String>,
}

impl MultiReading {
    /// Лемма составного чтения - леммы под-чтений через `_`.
    pub fn lemma(&self) -> String {
        self.readings.iter().map(|sub| sub.lemma()).join("_")
    }

    pub fn readings(&self) -> &[Analysis] {
        &self.readings
    }

    pub fn weight_str(&self) -> &str {
        &self.weight
    }

    pub fn cg_rule(&self) -> Option<&str> {
        self.cg_rule.as_deref()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.readings.iter().any(|sub| sub.contains(key))
    }

    pub fn hfst_str(&self) -> String {
        self.readings
            .iter()
            .map(|sub| sub.hfst_str())
            .join(&COMPOUND_SEP.to_string())
    }

    pub fn hfst_no_l2_str(&self) -> String {
        self.readings
            .iter()
            .map(|sub| sub.hfst_no_l2_str())
            .join(&COMPOUND_SEP.to_string())
    }

    /// CG3-блок составного чтения: под-чтения в обратном порядке,
    /// каждое следующее на один таб глубже предыдущего.
    pub fn cg3_str(&self, traces: bool) -> String {
        self.readings
            .iter()
            .rev()
            .enumerate()
            .map(|(depth, sub)| indent(&sub.cg3_str(traces), depth))
            .join("\n")
    }

    /// Замена тега в каждом под-чтении: первое вхождение на под-чтение.
    pub fn replace_tag(
        &mut self,
        old: impl AsRef<str>,
        new: impl AsRef<str>,
    ) -> Result<(), TagErr> {
        let old = old.as_ref();
        let new = new.as_ref();
        for sub in &mut self.readings {
            sub.replace_tag(old, new)?;
        }
        Ok(())
    }

    /// Замена тега только в под-чтении с индексом `which`.
    /// Невалидный индекс или отсутствие тега - тихий no-op.
    pub fn replace_tag_in(
        &mut self,
        which: usize,
        old: impl AsRef<str>,
        new: impl AsRef<str>,
    ) -> Result<(), TagErr> {
        // Имена разрешаются до проверки индекса: неизвестный тег - ошибка всегда.
        Tag::resolve(old.as_ref())?;
        Tag::resolve(new.as_ref())?;
        if let Some(sub) = self.readings.get_mut(which) {
            sub.replace_tag(old, new)?;
        }
        Ok(())
    }
}

fn indent(block: &str, depth: usize) -> String {
    block
        .lines()
        .map(|line| format!("{}{line}", "\t".repeat(depth)))
        .join("\n")
}

impl PartialEq for MultiReading {
    fn eq(&self, other: &Self) -> bool {
        self.readings == other.readings
    }
}

impl Eq for MultiReading {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
/// Разбор словоформы: плоское чтение или составное из нескольких под-чтений.
///
/// Общий набор операций реализован по ветвям варианта, без открытого
/// наследования: составная ветвь рекурсивно делегирует под-чтениям.
pub enum Analysis {
    Reading(Reading),
    Multi(MultiReading),
}

impl Analysis {
    /// Сборка разбора из нативной формы анализатора.
    ///
    /// Сначала делается попытка собрать плоское чтение; неизвестный тег
    /// означает, что форма может быть составной (`#`-разделённой) - тогда
    /// каждый сегмент собирается отдельно. Сегмент с маркером `+?`
    /// (неизвестный анализ) отбрасывается; `None` возвращается для
    /// неизвестной словоформы целиком.
    pub fn readify(
        raw: &str,
        weight: &str,
        cg_rule: Option<&str>,
    ) -> Result<Option<Self>, ParseErr> {
        if weight.parse::<f64>().is_err() {
            return Err(ParseErr::MalformedReading(format!("{raw} <W:{weight}>")));
        }

        match Reading::from_raw(raw, weight, cg_rule) {
            Ok(reading) => Ok(Some(Analysis::Reading(reading))),
            Err(TagErr::Unknown(_)) => {
                if raw.contains(COMPOUND_SEP) {
                    let mut readings = Vec::new();
                    for segment in raw.split(COMPOUND_SEP).filter(|s| !s.is_empty()) {
                        if let Some(sub) = Self::readify(segment, weight, cg_rule)? {
                            readings.push(sub);
                        }
                    }
                    // Менее двух пригодных сегментов - форма не была составной.
                    if readings.len() < 2 {
                        return Err(ParseErr::MalformedReading(raw.to_string()));
                    }
                    Ok(Some(Analysis::Multi(MultiReading {
                        readings,
                        weight: weight.to_string(),
                        cg_rule: cg_rule.map(|rule| rule.to_string()),
                    })))
                } else if raw.ends_with(UNKNOWN_MARKER) {
                    Ok(None)
                } else {
                    Err(ParseErr::MalformedReading(raw.to_string()))
                }
            }
        }
    }

    pub fn lemma(&self) -> String {
        match self {
            Analysis::Reading(reading) => reading.lemma().to_string(),
            Analysis::Multi(multi) => multi.lemma(),
        }
    }

    /// Леммы всех под-чтений в порядке следования.
    pub fn lemmas(&self) -> Vec<String> {
        match self {
            Analysis::Reading(reading) => vec![reading.lemma().to_string()],
            Analysis::Multi(multi) => multi
                .readings()
                .iter()
                .flat_map(|sub| sub.lemmas())
                .collect(),
        }
    }

    /// Теги разбора; для составного - сквозь все под-чтения.
    pub fn tags(&self) -> Vec<&'static Tag> {
        match self {
            Analysis::Reading(reading) => reading.tags().to_vec(),
            Analysis::Multi(multi) => multi
                .readings()
                .iter()
                .flat_map(|sub| sub.tags())
                .collect(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        match self {
            Analysis::Reading(reading) => reading.contains(key),
            Analysis::Multi(multi) => multi.contains(key),
        }
    }

    pub fn weight_str(&self) -> &str {
        match self {
            Analysis::Reading(reading) => reading.weight_str(),
            Analysis::Multi(multi) => multi.weight_str(),
        }
    }

    pub fn cg_rule(&self) -> Option<&str> {
        match self {
            Analysis::Reading(reading) => reading.cg_rule(),
            Analysis::Multi(multi) => multi.cg_rule(),
        }
    }

    pub fn hfst_str(&self) -> String {
        match self {
            Analysis::Reading(reading) => reading.hfst_str(),
            Analysis::Multi(multi) => multi.hfst_str(),
        }
    }

    pub fn hfst_no_l2_str(&self) -> String {
        match self {
            Analysis::Reading(reading) => reading.hfst_no_l2_str(),
            Analysis::Multi(multi) => multi.hfst_no_l2_str(),
        }
    }

    pub fn cg3_str(&self, traces: bool) -> String {
        match self {
            Analysis::Reading(reading) => reading.cg3_str(traces),
            Analysis::Multi(multi) => multi.cg3_str(traces),
        }
    }

    pub fn replace_tag(
        &mut self,
        old: impl AsRef<str>,
        new: impl AsRef<str>,
    ) -> Result<(), TagErr> {
        match self {
            Analysis::Reading(reading) => reading.replace_tag(old, new),
            Analysis::Multi(multi) => multi.replace_tag(old, new),
        }
    }

    /// Замена тега в под-чтении с индексом `which`;
    /// плоское чтение считается собственным нулевым под-чтением.
    pub fn replace_tag_in(
        &mut self,
        which: usize,
        old: impl AsRef<str>,
        new: impl AsRef<str>,
    ) -> Result<(), TagErr> {
        match self {
            Analysis::Reading(reading) => {
                Tag::resolve(old.as_ref())?;
                Tag::resolve(new.as_ref())?;
                if which == 0 {
                    reading.replace_tag(old, new)?;
                }
                Ok(())
            }
            Analysis::Multi(multi) => multi.replace_tag_in(which, old, new),
        }
    }

    /// Порождение поверхностной формы через внешний генератор.
    /// L2-теги отфильтровываются: лексикон генератора их не кодирует.
    pub fn generate(&self, generator: &impl Generator) -> RazborResult<Option<String>> {
        generator.generate(&self.hfst_no_l2_str())
    }
}

impl Ord for Analysis {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Analysis::Reading(a), Analysis::Reading(b)) => a.cmp(b),
            (Analysis::Multi(a), Analysis::Multi(b)) => a.readings.cmp(&b.readings),
            (Analysis::Reading(_), Analysis::Multi(_)) => Ordering::Less,
            (Analysis::Multi(_), Analysis::Reading(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Analysis {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Разбиение по одиночному `+`; `+` в конце строки не разделяет.
fn split_single_plus(raw: &str) -> Vec<&str> {
    let bytes = raw.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;

    for i in 0..bytes.len() {
        if bytes[i] == b'+' && i + 1 < bytes.len() && bytes[i + 1] != b'+' {
            parts.push(&raw[start..i]);
            start = i + 1;
        }
    }
    parts.push(&raw[start..]);
    parts
}
