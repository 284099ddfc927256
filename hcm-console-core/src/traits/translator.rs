//! 翻译协作者

/// Translation lookup. Pure: the core relies on nothing but the returned text.
pub trait Translator: Send + Sync {
    /// Translate `key`, substituting `{name}` placeholders from `params`.
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String;
}

/// Returns the key itself with placeholders filled in.
///
/// Message keys are written in the source language, so this is also the
/// fallback when no catalogue is loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        interpolate(key, params)
    }
}

/// Replace every `{name}` in `template` with the matching value.
pub fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    params
        .iter()
        .fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_keeps_plain_keys() {
        assert_eq!(IdentityTranslator.translate("提交成功", &[]), "提交成功");
    }

    #[test]
    fn placeholders_are_filled() {
        let text = IdentityTranslator.translate("已选择 {count} 台实例", &[("count", "5")]);
        assert_eq!(text, "已选择 5 台实例");
    }

    #[test]
    fn unknown_placeholders_stay() {
        assert_eq!(interpolate("{a} {b}", &[("a", "1")]), "1 {b}");
    }
}
