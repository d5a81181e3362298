use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use crate::errors::TagErr;

/// Множество тегов чтения для проверки вхождения за O(1).
pub type TagSet = HashSet<&'static Tag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Грамматический тег в нотации HFST-анализатора.
///
/// Теги интернированы: одно имя всегда разрешается в один и тот же
/// `&'static Tag` из реестра, собираемого один раз при старте процесса.
pub struct Tag {
    name: &'static str,
    is_l2: bool,
    ambig_alternative: Option<&'static str>,
}

impl Tag {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Тег размечает ошибку изучающего язык (L2);
    /// такие теги не знает лексикон генератора.
    pub fn is_l2(&self) -> bool {
        self.is_l2
    }

    /// Тег, с которым данный может считаться эквивалентным при проверках вхождения.
    pub fn ambig_alternative(&self) -> Option<&'static Tag> {
        self.ambig_alternative.and_then(|name| registry().get(name))
    }

    /// Разрешение имени в интернированный тег.
    pub fn resolve(name: &str) -> Result<&'static Tag, TagErr> {
        registry()
            .get(name)
            .ok_or_else(|| TagErr::Unknown(name.to_string()))
    }

    pub fn known(name: &str) -> bool {
        registry().contains_key(name)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        self.name
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Вхождение `key` в набор тегов: либо сам тег присутствует в наборе,
/// либо в наборе присутствует его зарегистрированная альтернатива.
pub fn is_tag_or_alias(key: &str, set: &TagSet) -> bool {
    match Tag::resolve(key) {
        Ok(tag) => {
            set.contains(tag)
                || tag
                    .ambig_alternative()
                    .map(|alt| set.contains(alt))
                    .unwrap_or(false)
        }
        Err(_) => false,
    }
}

fn registry() -> &'static HashMap<&'static str, Tag> {
    static REGISTRY: OnceLock<HashMap<&'static str, Tag>> = OnceLock::new();
    REGISTRY.get_or_init(|| TAG_TABLE.iter().map(|tag| (tag.name, *tag)).collect())
}

const fn tag(name: &'static str) -> Tag {
    Tag {
        name,
        is_l2: false,
        ambig_alternative: None,
    }
}

const fn ambig(name: &'static str, alternative: &'static str) -> Tag {
    Tag {
        name,
        is_l2: false,
        ambig_alternative: Some(alternative),
    }
}

const fn l2(name: &'static str) -> Tag {
    Tag {
        name,
        is_l2: true,
        ambig_alternative: None,
    }
}

#[rustfmt::skip]
/// Статическая таблица тегов HFST-анализатора русского языка.
static TAG_TABLE: &[Tag] = &[
    // Части речи
    tag("A"), tag("Abbr"), tag("Adv"), tag("CC"), tag("CS"), tag("Det"),
    tag("Interj"), tag("N"), tag("Num"), tag("Paren"), tag("Pcle"), tag("Po"),
    tag("Pr"), tag("Pron"), tag("V"),
    // Имена собственные и подклассы существительных
    tag("Prop"), tag("Fac"), tag("Sem/Ani"), tag("Sem/Hum"), tag("Sem/Geo"),
    // Род
    tag("Msc"), tag("Fem"), tag("Neu"), tag("MFN"),
    // Одушевленность
    tag("Anim"), tag("Inan"), tag("AnIn"),
    // Число
    tag("Sg"), tag("Pl"),
    // Падежи. Вторые родительный/винительный/предложный при сопоставлении
    // могут считаться соответствующим первым падежом.
    tag("Nom"), tag("Acc"), tag("Gen"), tag("Dat"), tag("Ins"), tag("Loc"),
    tag("Voc"),
    ambig("Gen2", "Gen"), ambig("Acc2", "Acc"), ambig("Loc2", "Loc"),
    // Счетная форма
    ambig("Count", "Gen"),
    // Прилагательные и степени сравнения
    tag("Short"), tag("Cmpar"), tag("Sup"), tag("Pred"),
    // Глагольная морфология
    tag("Impf"), tag("Perf"), tag("IV"), tag("TV"),
    tag("Inf"), tag("Imp"), tag("Prs"), tag("Pst"), tag("Fut"),
    tag("Sg1"), tag("Sg2"), tag("Sg3"), tag("Pl1"), tag("Pl2"), tag("Pl3"),
    tag("PrsAct"), tag("PrsPass"), tag("PstAct"), tag("PstPass"),
    tag("Ger"), tag("Pass"), tag("Imprs"),
    // Подклассы местоимений и числительных
    tag("Pers"), tag("Dem"), tag("Interr"), tag("Indef"), tag("Neg"),
    tag("Recip"), tag("Refl"), tag("Rel"), tag("Ord"), tag("Coll"),
    // Пунктуация и служебные
    tag("CLB"), tag("PUNCT"), tag("LEFT"), tag("RIGHT"),
    // Употребление
    tag("Use/NG"), tag("Use/Ant"), tag("Err/Orth"),
    // Ошибки изучающих язык: лексикон генератора их не кодирует.
    l2("Err/L2_FV"), l2("Err/L2_NoFV"), l2("Err/L2_ii"), l2("Err/L2_Pal"),
    l2("Err/L2_NoGem"), l2("Err/L2_e2je"), l2("Err/L2_je2e"),
    l2("Err/L2_sh2shch"), l2("Err/L2_shch2sh"), l2("Err/L2_H2S"),
];
