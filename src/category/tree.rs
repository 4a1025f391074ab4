use std::collections::HashMap;

use super::models::{Category, CategoryImage, CategoryView};
use crate::utils::AppError;
use crate::utils::types::ImageView;

/// In-memory category hierarchy assembled from flat `parent_id` edges.
///
/// Rows are expected to form a forest. Every walk is bounded by `max_depth`
/// so a cycle in stored data surfaces as [`AppError::CategoryDepth`] instead
/// of unbounded recursion.
#[derive(Debug)]
pub struct CategoryTree {
    nodes: HashMap<i32, (Category, Option<CategoryImage>)>,
    children: HashMap<i32, Vec<i32>>,
    roots: Vec<i32>,
    max_depth: usize,
}

impl CategoryTree {
    pub fn new(rows: Vec<(Category, Option<CategoryImage>)>, max_depth: usize) -> Self {
        let mut children: HashMap<i32, Vec<i32>> = HashMap::new();
        let mut roots = Vec::new();

        for (category, _) in &rows {
            match category.parent_id {
                Some(parent) => children.entry(parent).or_default().push(category.id),
                None => roots.push(category.id),
            }
        }

        roots.sort_unstable();
        for ids in children.values_mut() {
            ids.sort_unstable();
        }

        let nodes = rows
            .into_iter()
            .map(|(category, image)| (category.id, (category, image)))
            .collect();

        Self {
            nodes,
            children,
            roots,
            max_depth,
        }
    }

    pub fn contains(&self, id: i32) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn children(&self, id: i32) -> &[i32] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `id` followed by all of its descendants, depth first.
    pub fn subtree(&self, id: i32) -> Result<Vec<&Category>, AppError> {
        let mut out = Vec::new();
        let mut stack = vec![(self.node(id)?, 1usize)];

        while let Some(((category, _), depth)) = stack.pop() {
            if depth > self.max_depth {
                return Err(AppError::CategoryDepth(self.max_depth));
            }
            out.push(category);
            for child in self.children(category.id).iter().rev() {
                stack.push((self.node(*child)?, depth + 1));
            }
        }

        Ok(out)
    }

    pub fn subtree_ids(&self, id: i32) -> Result<Vec<i32>, AppError> {
        Ok(self.subtree(id)?.into_iter().map(|c| c.id).collect())
    }

    pub fn render(&self, id: i32) -> Result<CategoryView, AppError> {
        self.render_at(id, 1)
    }

    pub fn render_roots(&self) -> Result<Vec<CategoryView>, AppError> {
        self.roots.iter().map(|id| self.render(*id)).collect()
    }

    fn render_at(&self, id: i32, depth: usize) -> Result<CategoryView, AppError> {
        if depth > self.max_depth {
            return Err(AppError::CategoryDepth(self.max_depth));
        }
        let (category, image) = self.node(id)?;

        Ok(CategoryView {
            id: category.id,
            title: category.title.clone(),
            image: image.as_ref().map(ImageView::from),
            subcategories: self
                .children(id)
                .iter()
                .map(|child| self.render_at(*child, depth + 1))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Whether re-parenting `id` under `new_parent` would close a loop.
    pub fn would_cycle(&self, id: i32, new_parent: i32) -> Result<bool, AppError> {
        if id == new_parent {
            return Ok(true);
        }
        let mut cursor = self.node(new_parent)?.0.parent_id;
        let mut steps = 0;

        while let Some(ancestor) = cursor {
            if ancestor == id {
                return Ok(true);
            }
            steps += 1;
            if steps > self.max_depth {
                return Err(AppError::CategoryDepth(self.max_depth));
            }
            cursor = self.nodes.get(&ancestor).and_then(|(c, _)| c.parent_id);
        }

        Ok(false)
    }

    fn node(&self, id: i32) -> Result<&(Category, Option<CategoryImage>), AppError> {
        self.nodes
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("category {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i32, parent_id: Option<i32>) -> Category {
        Category {
            id,
            title: format!("category {id}"),
            description: String::new(),
            image_id: Some(id * 10),
            parent_id,
        }
    }

    fn image(id: i32) -> CategoryImage {
        CategoryImage {
            id: id * 10,
            src: format!("images/{id}.png"),
            alt: Some(format!("alt {id}")),
        }
    }

    fn with_image(id: i32, parent: Option<i32>) -> (Category, Option<CategoryImage>) {
        (category(id, parent), Some(image(id)))
    }

    fn without_image(id: i32, parent: Option<i32>) -> (Category, Option<CategoryImage>) {
        let mut c = category(id, parent);
        c.image_id = None;
        (c, None)
    }

    #[test]
    fn three_levels_render_nested_with_images() {
        let tree = CategoryTree::new(
            vec![
                with_image(1, None),
                with_image(2, Some(1)),
                with_image(3, Some(2)),
            ],
            32,
        );

        let root = tree.render(1).unwrap();
        assert_eq!(root.image.as_ref().unwrap().src, "images/1.png");

        let child = &root.subcategories[0];
        assert_eq!(child.id, 2);
        assert_eq!(child.image.as_ref().unwrap().alt.as_deref(), Some("alt 2"));

        let grandchild = &child.subcategories[0];
        assert_eq!(grandchild.id, 3);
        assert_eq!(grandchild.image.as_ref().unwrap().src, "images/3.png");
        assert!(grandchild.subcategories.is_empty());
        assert_eq!(root.subcategories.len(), 1);
        assert_eq!(child.subcategories.len(), 1);
    }

    #[test]
    fn missing_image_renders_null_and_leaf_renders_empty_list() {
        let tree = CategoryTree::new(vec![without_image(1, None)], 32);
        let json = serde_json::to_value(tree.render(1).unwrap()).unwrap();

        assert!(json["image"].is_null());
        assert_eq!(json["subcategories"], serde_json::json!([]));
    }

    #[test]
    fn subtree_lists_every_descendant_once() {
        let tree = CategoryTree::new(
            vec![
                without_image(1, None),
                without_image(2, Some(1)),
                without_image(3, Some(1)),
                without_image(4, Some(2)),
                without_image(5, Some(4)),
                without_image(6, None),
            ],
            32,
        );

        let ids = tree.subtree_ids(1).unwrap();
        assert_eq!(ids, vec![1, 2, 4, 5, 3]);
        assert_eq!(tree.subtree_ids(6).unwrap(), vec![6]);
    }

    #[test]
    fn roots_are_categories_without_parent() {
        let tree = CategoryTree::new(
            vec![
                without_image(7, None),
                without_image(2, Some(7)),
                without_image(3, None),
            ],
            32,
        );

        let roots = tree.render_roots().unwrap();
        let ids: Vec<i32> = roots.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 7]);
        assert_eq!(roots[1].subcategories[0].id, 2);
    }

    #[test]
    fn cyclic_data_hits_the_depth_guard() {
        let tree = CategoryTree::new(
            vec![without_image(1, Some(2)), without_image(2, Some(1))],
            8,
        );

        assert!(matches!(tree.render(1), Err(AppError::CategoryDepth(8))));
        assert!(matches!(tree.subtree(1), Err(AppError::CategoryDepth(8))));
        assert!(tree.render_roots().unwrap().is_empty());
    }

    #[test]
    fn unknown_category_is_not_found() {
        let tree = CategoryTree::new(vec![without_image(1, None)], 32);
        assert!(matches!(tree.render(9), Err(AppError::NotFound(_))));
    }

    #[test]
    fn reparenting_under_a_descendant_is_a_cycle() {
        let tree = CategoryTree::new(
            vec![
                without_image(1, None),
                without_image(2, Some(1)),
                without_image(3, Some(2)),
                without_image(4, None),
            ],
            32,
        );

        assert!(tree.would_cycle(1, 3).unwrap());
        assert!(tree.would_cycle(2, 2).unwrap());
        assert!(!tree.would_cycle(3, 4).unwrap());
        assert!(!tree.would_cycle(4, 1).unwrap());
    }
}
