//! Build a new document from an ordered selection of source pages.
//!
//! The result is constructed from scratch: only objects reachable from the
//! selected pages are copied, so unselected pages, the source page tree,
//! outlines and other catalog entries never leak into the output.

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

use super::PdfDocument;
use crate::error::{Error, Result};
use crate::selection::PageEntry;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Extract `selection` from `source` into a new document.
///
/// Output page `i` is a copy of source page `selection[i]`. Order is kept and
/// duplicates produce repeated pages. Any invalid entry fails the whole call
/// before anything is copied.
pub fn extract_pages(source: &PdfDocument, selection: &[PageEntry]) -> Result<Document> {
    if selection.is_empty() {
        return Err(Error::EmptySelection);
    }

    let page_ids = source.page_ids();
    let bound = page_ids.len() as u32;
    let numbers = selection
        .iter()
        .map(|entry| entry.resolve(bound))
        .collect::<Result<Vec<u32>>>()?;
    let selected: Vec<ObjectId> = numbers
        .iter()
        .map(|number| page_ids[(number - 1) as usize].1)
        .collect();

    let mut copier = PageCopier::new(&source.doc, &page_ids, &selected);
    for (number, page_id) in numbers.iter().zip(&selected) {
        debug!(page = number, "copying page");
        copier.append_page(*page_id)?;
    }

    Ok(copier.finish())
}

/// Extract plain page numbers; see [`extract_pages`].
pub fn extract_page_numbers(source: &PdfDocument, pages: &[u32]) -> Result<Document> {
    let selection: Vec<PageEntry> = pages.iter().copied().map(PageEntry::from).collect();
    extract_pages(source, &selection)
}

struct PageCopier<'a> {
    source: &'a Document,
    target: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    /// Source object id -> copied object id
    copied: HashMap<ObjectId, ObjectId>,
    /// Copied ids whose source object has not been written yet
    pending: VecDeque<(ObjectId, ObjectId)>,
    /// Source page id -> id of its first copy; `None` for unselected pages
    page_copies: HashMap<ObjectId, Option<ObjectId>>,
    /// Pages whose first copy has already been written
    written: HashSet<ObjectId>,
    /// Intermediate nodes of the source page tree
    tree_nodes: HashSet<ObjectId>,
}

impl<'a> PageCopier<'a> {
    fn new(source: &'a Document, page_ids: &[(u32, ObjectId)], selected: &[ObjectId]) -> Self {
        let mut target = Document::with_version(source.version.clone());
        let pages_id = target.new_object_id();

        // Every selected page gets its first-copy id up front, so links to
        // pages later in the selection resolve too.
        let mut page_copies: HashMap<ObjectId, Option<ObjectId>> =
            page_ids.iter().map(|(_, id)| (*id, None)).collect();
        for page_id in selected {
            let slot = page_copies.entry(*page_id).or_insert(None);
            if slot.is_none() {
                *slot = Some(target.new_object_id());
            }
        }

        let mut tree_nodes = HashSet::new();
        for (_, page_id) in page_ids {
            let mut parent = source.get_dictionary(*page_id).ok().and_then(parent_of);
            while let Some(id) = parent {
                if !tree_nodes.insert(id) {
                    break;
                }
                parent = source.get_dictionary(id).ok().and_then(parent_of);
            }
        }

        PageCopier {
            source,
            target,
            pages_id,
            kids: Vec::new(),
            copied: HashMap::new(),
            pending: VecDeque::new(),
            page_copies,
            written: HashSet::new(),
            tree_nodes,
        }
    }

    fn append_page(&mut self, source_id: ObjectId) -> Result<()> {
        let source = self.source;
        let page = source.get_dictionary(source_id)?;
        let first_copy = self.page_copies.get(&source_id).copied().flatten();
        let new_id = match first_copy {
            Some(id) if !self.written.contains(&source_id) => {
                self.written.insert(source_id);
                id
            }
            _ => self.target.new_object_id(),
        };

        let mut dict = Dictionary::new();
        for (key, value) in page.iter() {
            if key.as_slice() == b"Parent" {
                continue;
            }
            let value = self.copy_object(value);
            dict.set(key.clone(), value);
        }
        for key in INHERITABLE {
            if dict.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(source, page, key) {
                let value = self.copy_object(value);
                dict.set(key, value);
            }
        }
        dict.set("Parent", self.pages_id);

        self.target.objects.insert(new_id, Object::Dictionary(dict));
        self.kids.push(Object::Reference(new_id));
        self.drain_pending();
        Ok(())
    }

    /// Write out every indirect object queued by [`Self::copy_reference`].
    /// Reference chains are walked here, iteratively, not on the call stack.
    fn drain_pending(&mut self) {
        let source = self.source;
        while let Some((source_id, new_id)) = self.pending.pop_front() {
            // A reference to a missing object is equivalent to null
            let copy = match source.get_object(source_id) {
                Ok(object) => self.copy_object(object),
                Err(_) => Object::Null,
            };
            self.target.objects.insert(new_id, copy);
        }
    }

    /// Copy a direct object. Indirect references are renumbered and queued.
    fn copy_object(&mut self, object: &Object) -> Object {
        match object {
            Object::Reference(id) => self.copy_reference(*id),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.copy_object(item)).collect())
            }
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(dict)),
            Object::Stream(stream) => {
                let mut stream = stream.clone();
                stream.dict = self.copy_dictionary(&stream.dict);
                Object::Stream(stream)
            }
            other => other.clone(),
        }
    }

    fn copy_dictionary(&mut self, dict: &Dictionary) -> Dictionary {
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            let value = self.copy_object(value);
            copy.set(key.clone(), value);
        }
        copy
    }

    fn copy_reference(&mut self, id: ObjectId) -> Object {
        if let Some(copy) = self.page_copies.get(&id) {
            return copy.map(Object::Reference).unwrap_or(Object::Null);
        }
        if self.tree_nodes.contains(&id) {
            return Object::Null;
        }
        if let Some(new_id) = self.copied.get(&id) {
            return Object::Reference(*new_id);
        }

        let new_id = self.target.new_object_id();
        self.copied.insert(id, new_id);
        self.pending.push_back((id, new_id));
        Object::Reference(new_id)
    }

    fn finish(mut self) -> Document {
        let count = self.kids.len() as i64;
        let mut pages = Dictionary::new();
        pages.set("Type", "Pages");
        pages.set("Kids", self.kids);
        pages.set("Count", count);
        self.target
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", "Catalog");
        catalog.set("Pages", self.pages_id);
        let catalog_id = self.target.add_object(catalog);
        self.target.trailer.set("Root", catalog_id);

        self.target
    }
}

fn parent_of(dict: &Dictionary) -> Option<ObjectId> {
    dict.get(b"Parent").and_then(Object::as_reference).ok()
}

/// Look up an inheritable attribute on the ancestors of `page`.
fn inherited_attribute<'d>(
    doc: &'d Document,
    page: &Dictionary,
    key: &[u8],
) -> Option<&'d Object> {
    let mut visited = HashSet::new();
    let mut parent = parent_of(page);
    while let Some(id) = parent {
        if !visited.insert(id) {
            return None;
        }
        let node = doc.get_dictionary(id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        parent = parent_of(node);
    }
    None
}
