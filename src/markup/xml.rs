// WHY: Fixed-schema XML for downstream drivers and snapshot tests. Nodes and edges
// are emitted in span order and element fields in key order so output is stable.

use std::collections::BTreeMap;

use super::{Annotation, MarkupGraph};
use crate::text::xml_scrub;

/// Render `<key> value </key>` lines in key order
fn fields_xml(fields: &BTreeMap<&str, String>) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("<{0}> {1} </{0}>\n", key, value))
        .collect()
}

impl MarkupGraph {
    fn tag_xml(&self, annotation: &Annotation) -> String {
        let span = annotation.span();
        let scope = self.scope(annotation.id()).unwrap_or(self.bounds());

        let mut fields = BTreeMap::new();
        fields.insert("id", annotation.id().to_string());
        fields.insert("phrase", xml_scrub(annotation.found_text()));
        fields.insert("literal", xml_scrub(annotation.item().literal()));
        fields.insert("category", xml_scrub(&annotation.item().category_string()));
        fields.insert("rule", annotation.rule().to_string());
        fields.insert("spanStart", self.char_offset(span.start).to_string());
        fields.insert("spanStop", self.char_offset(span.end).to_string());
        fields.insert("scopeStart", self.char_offset(scope.start).to_string());
        fields.insert("scopeStop", self.char_offset(scope.end).to_string());

        format!("<tagObject>\n{}</tagObject>\n", fields_xml(&fields))
    }

    fn node_xml(&self, annotation: &Annotation) -> String {
        let mut attributes = BTreeMap::new();
        attributes.insert("category", annotation.mode().to_string());

        let mut xml = String::from("<node>\n");
        xml.push_str(&fields_xml(&attributes));
        xml.push_str(&self.tag_xml(annotation));

        for modifier in self.predecessors(annotation.id()) {
            xml.push_str("<modifiedBy>\n");
            xml.push_str(&format!("<modifyingNode> {} </modifyingNode>\n", modifier.id()));
            xml.push_str(&format!(
                "<modifyingCategory> {} </modifyingCategory>\n",
                xml_scrub(&modifier.item().category_string())
            ));
            xml.push_str("</modifiedBy>\n");
        }
        for modified in self.successors(annotation.id()) {
            xml.push_str("<modifies>\n");
            xml.push_str(&format!("<modifiedNode> {} </modifiedNode>\n", modified.id()));
            xml.push_str("</modifies>\n");
        }

        xml.push_str("</node>\n");
        xml
    }

    /// Serialize raw text, clean text, nodes (with cross references) and edges
    pub fn to_xml(&self) -> String {
        let nodes: String = self.annotations().into_iter().map(|a| self.node_xml(a)).collect();

        let mut edges = String::new();
        for (from, to, kind) in self.edges() {
            let mut attributes = BTreeMap::new();
            attributes.insert("category", kind.as_str().to_string());
            edges.push_str("<edge>\n");
            edges.push_str(&format!("<startNode> {} </startNode>\n", from));
            edges.push_str(&format!("<endNode> {} </endNode>\n", to));
            edges.push_str(&fields_xml(&attributes));
            edges.push_str("</edge>\n");
        }

        format!(
            "<ConTextMarkup>\n<rawText> {} </rawText>\n<cleanText> {} </cleanText>\n<nodes>\n{}</nodes>\n<edges>\n{}</edges>\n</ConTextMarkup>\n",
            xml_scrub(self.raw_text()),
            xml_scrub(self.text()),
            nodes,
            edges
        )
    }
}
