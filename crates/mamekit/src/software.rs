//! Software list wrappers joining list documents with support data.

use std::collections::BTreeMap;
use std::sync::Arc;

use mame_model::{InfoPair, SoftwareElement, SoftwareListElement, SoftwarePart, SoftwareSupport};
use mame_support::{DatFolder, HistoryText};

use crate::MameError;

fn multimap<'a>(pairs: &'a [InfoPair]) -> BTreeMap<&'a str, Vec<Option<&'a str>>> {
    let mut map: BTreeMap<&str, Vec<Option<&str>>> = BTreeMap::new();
    for pair in pairs {
        map.entry(pair.name.as_str())
            .or_default()
            .push(pair.value.as_deref());
    }
    map
}

/// One software list. The basename convention `nes_ade` splits into a
/// grouping (`nes`) and a list kind (`ade`).
#[derive(Debug)]
pub struct SoftwareList {
    element: SoftwareListElement,
    grouping: String,
    kind: Option<String>,
    dats: Option<Arc<DatFolder>>,
}

impl SoftwareList {
    pub fn new(element: SoftwareListElement, dats: Option<Arc<DatFolder>>) -> Self {
        let basename = element.basename();
        let (grouping, kind) = match basename.split_once('_') {
            Some((grouping, kind)) => (grouping.to_string(), Some(kind.to_string())),
            None => (basename.to_string(), None),
        };
        SoftwareList {
            element,
            grouping,
            kind,
            dats,
        }
    }

    pub fn element(&self) -> &SoftwareListElement {
        &self.element
    }

    pub fn basename(&self) -> &str {
        self.element.basename()
    }

    /// Human readable name.
    pub fn name(&self) -> &str {
        self.element.description()
    }

    /// The machine-family part of the basename.
    pub fn grouping(&self) -> &str {
        &self.grouping
    }

    /// The list-kind suffix of the basename, e.g. `cass` or `flop`.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn software_count(&self) -> usize {
        self.element.len()
    }

    /// Iterate the software items as wrappers.
    pub fn software(&self) -> impl Iterator<Item = Software<'_>> {
        self.element
            .software()
            .iter()
            .map(move |element| Software {
                list: self,
                element,
            })
    }

    /// One software item by basename.
    pub fn get(&self, basename: &str) -> Option<Software<'_>> {
        self.element.get(basename).map(|element| Software {
            list: self,
            element,
        })
    }
}

/// One software item within its list.
#[derive(Debug, Clone, Copy)]
pub struct Software<'a> {
    list: &'a SoftwareList,
    element: &'a SoftwareElement,
}

impl<'a> Software<'a> {
    pub fn element(&self) -> &'a SoftwareElement {
        self.element
    }

    pub fn list(&self) -> &'a SoftwareList {
        self.list
    }

    /// Combined identifier, `list:software`.
    pub fn id(&self) -> String {
        format!("{}:{}", self.list.basename(), self.basename())
    }

    pub fn basename(&self) -> &'a str {
        self.element.basename()
    }

    /// Human readable name.
    pub fn name(&self) -> &'a str {
        self.element.description()
    }

    pub fn publisher(&self) -> Option<&'a str> {
        self.element.publisher()
    }

    pub fn year(&self) -> Option<i64> {
        self.element.year()
    }

    pub fn supported(&self) -> SoftwareSupport {
        self.element.supported()
    }

    /// Compatibility notes about running this software, trimmed.
    pub fn notes(&self) -> Option<&'a str> {
        self.element
            .notes()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
    }

    pub fn parent_basename(&self) -> Option<&'a str> {
        self.element.clone_of()
    }

    /// The clone parent, resolved within the same list.
    pub fn parent(&self) -> Option<Software<'a>> {
        self.list.get(self.element.clone_of()?)
    }

    pub fn parent_name(&self) -> Option<&'a str> {
        self.parent().map(|parent| parent.name())
    }

    /// `<info>` pairs grouped by name.
    pub fn infos(&self) -> Result<BTreeMap<&'a str, Vec<Option<&'a str>>>, MameError> {
        Ok(multimap(self.element.infos()?))
    }

    /// First value of a named `<info>` pair.
    pub fn info(&self, name: &str) -> Result<Option<&'a str>, MameError> {
        Ok(self.element.info(name)?)
    }

    /// `<sharedfeat>` pairs grouped by name.
    pub fn shared_features(&self) -> Result<BTreeMap<&'a str, Vec<Option<&'a str>>>, MameError> {
        Ok(multimap(self.element.shared_features()?))
    }

    pub fn shared_feature(&self, name: &str) -> Result<Option<&'a str>, MameError> {
        Ok(self
            .element
            .shared_features()?
            .iter()
            .find(|pair| pair.name == name)
            .and_then(|pair| pair.value.as_deref()))
    }

    pub fn parts(&self) -> Result<&'a [SoftwarePart], MameError> {
        Ok(self.element.parts()?)
    }

    /// The single part, when there is exactly one.
    pub fn only_part(&self) -> Result<Option<&'a SoftwarePart>, MameError> {
        let parts = self.element.parts()?;
        Ok(match parts {
            [part] => Some(part),
            _ => None,
        })
    }

    /// History entry for this item, falling back to the clone parent's.
    pub fn history(&self) -> Result<Option<HistoryText>, MameError> {
        let Some(dats) = self.list.dats.as_deref() else {
            return Ok(None);
        };
        if let Some(entry) = dats.software_history(self.list.basename(), self.basename())? {
            return Ok(Some(entry));
        }
        match self.element.clone_of() {
            Some(parent) => Ok(dats.software_history(self.list.basename(), parent)?),
            None => Ok(None),
        }
    }

    /// Async variant of [`history`](Self::history).
    pub async fn history_async(&self) -> Result<Option<HistoryText>, MameError> {
        let Some(dats) = self.list.dats.as_deref() else {
            return Ok(None);
        };
        if let Some(entry) = dats
            .software_history_async(self.list.basename(), self.basename())
            .await?
        {
            return Ok(Some(entry));
        }
        match self.element.clone_of() {
            Some(parent) => Ok(dats
                .software_history_async(self.list.basename(), parent)
                .await?),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mame_model::SoftwareListElement;
    use mame_xml::parse;

    const LIST: &str = r#"
        <softwarelist name="nes_ade" description="NES Aladdin Deck Enhancer cartridges">
            <software name="dizzy">
                <description>The Fantastic Adventures of Dizzy</description>
                <year>1992</year>
                <publisher>Camerica</publisher>
                <info name="serial" value="CAM-ADE-DIZ"/>
                <part name="cart" interface="ade_cart">
                    <dataarea name="rom" size="262144"/>
                </part>
            </software>
            <software name="dizzyp" cloneof="dizzy">
                <description>The Fantastic Adventures of Dizzy (prototype)</description>
                <notes>  Dumped from a dev cart.  </notes>
            </software>
        </softwarelist>
    "#;

    fn list() -> SoftwareList {
        let element = SoftwareListElement::from_document(parse(LIST.as_bytes()).unwrap()).unwrap();
        SoftwareList::new(element, None)
    }

    #[test]
    fn basename_splits_into_grouping_and_kind() {
        let list = list();
        assert_eq!(list.basename(), "nes_ade");
        assert_eq!(list.grouping(), "nes");
        assert_eq!(list.kind(), Some("ade"));
        assert_eq!(list.software_count(), 2);
    }

    #[test]
    fn software_wrappers() {
        let list = list();
        let dizzy = list.get("dizzy").expect("dizzy");
        assert_eq!(dizzy.id(), "nes_ade:dizzy");
        assert_eq!(dizzy.name(), "The Fantastic Adventures of Dizzy");
        assert_eq!(dizzy.year(), Some(1992));
        assert_eq!(dizzy.info("serial").unwrap(), Some("CAM-ADE-DIZ"));
        assert_eq!(dizzy.parts().unwrap().len(), 1);
        assert!(dizzy.only_part().unwrap().is_some());
        assert_eq!(dizzy.notes(), None);

        let proto = list.get("dizzyp").expect("dizzyp");
        assert_eq!(proto.parent_basename(), Some("dizzy"));
        assert_eq!(
            proto.parent_name(),
            Some("The Fantastic Adventures of Dizzy")
        );
        assert_eq!(proto.notes(), Some("Dumped from a dev cart."));
        // no dat folder configured: history degrades to nothing
        assert!(proto.history().unwrap().is_none());
    }

    #[test]
    fn ungrouped_basename_has_no_kind() {
        let xml = r#"<softwarelist name="nes" description="NES cartridges"/>"#;
        let element = SoftwareListElement::from_document(parse(xml.as_bytes()).unwrap()).unwrap();
        let list = SoftwareList::new(element, None);
        assert_eq!(list.grouping(), "nes");
        assert_eq!(list.kind(), None);
    }
}
