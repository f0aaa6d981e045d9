use std::{collections::HashMap, fmt, ops::Deref, sync::Arc};

use crate::api::{Comment, CommentId};

/// The root comments of a post, shared between the cache and its views
pub type Forest = Arc<[Arc<CommentNode>]>;

/// A comment along with all the replies to it, in fetch order.
///
/// Replies are shared, so cloning a node is shallow and views can hand out subtrees
/// without copying them.
#[derive(Clone)]
pub struct CommentNode {
    pub comment: Comment,
    pub children: Vec<Arc<CommentNode>>,
}

impl CommentNode {
    pub fn new(comment: Comment) -> CommentNode {
        CommentNode {
            comment,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> CommentId {
        self.comment.id
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of direct replies
    pub fn reply_count(&self) -> usize {
        self.children.len()
    }

    /// Number of nodes below this one, at any depth
    pub fn descendant_count(&self) -> usize {
        self.depth_first().count() - 1
    }

    /// Pre-order walk over this node and its descendants, yielding each node with its
    /// depth relative to `self`
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            stack: vec![(self, 0)],
        }
    }

    pub fn find(&self, id: CommentId) -> Option<&CommentNode> {
        self.depth_first().map(|(n, _)| n).find(|n| n.id() == id)
    }
}

impl Deref for CommentNode {
    type Target = Comment;

    fn deref(&self) -> &Comment {
        &self.comment
    }
}

// Not derived, as that would recurse once per level. A pre-order walk with depths
// pins down the shape of the tree.
impl PartialEq for CommentNode {
    fn eq(&self, other: &CommentNode) -> bool {
        self.depth_first()
            .map(|(n, d)| (&n.comment, d))
            .eq(other.depth_first().map(|(n, d)| (&n.comment, d)))
    }
}

impl Eq for CommentNode {}

impl fmt::Debug for CommentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.depth_first().map(|(n, d)| (d, &n.comment)))
            .finish()
    }
}

impl Drop for CommentNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut n) = stack.pop() {
            // shared subtrees are released by their last owner
            if let Some(n) = Arc::get_mut(&mut n) {
                stack.append(&mut n.children);
            }
        }
    }
}

pub struct DepthFirst<'a> {
    stack: Vec<(&'a CommentNode, usize)>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = (&'a CommentNode, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|c| (&**c, depth + 1)));
        Some((node, depth))
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    New,
    InProgress,
    Done,
}

/// Turns the flat comment list of a post into a forest of comment trees.
///
/// Sibling and root order follow the order of `comments`. Every comment of the input
/// appears exactly once in the output: a comment whose parent is not in `comments`,
/// that is its own parent, or whose ancestry loops back onto itself, is promoted to a
/// root. When ids are duplicated, replies attach to the first comment bearing the id.
pub fn build_tree(comments: &[Comment]) -> Vec<Arc<CommentNode>> {
    let mut index = HashMap::with_capacity(comments.len());
    for (i, c) in comments.iter().enumerate() {
        index.entry(c.id).or_insert(i);
    }

    let mut parent = comments
        .iter()
        .map(|c| match c.parent_comment_id {
            None => None,
            Some(p) if p == c.id => {
                tracing::debug!(comment = ?c.id, "comment is its own parent, promoting to root");
                None
            }
            Some(p) => {
                let p = index.get(&p).copied();
                if p.is_none() {
                    tracing::debug!(comment = ?c.id, parent = ?c.parent_comment_id, "parent not fetched, promoting to root");
                }
                p
            }
        })
        .collect::<Vec<Option<usize>>>();

    // Break parent loops: walk each ancestry chain once, and if it reaches a comment
    // already on the current chain, the last link of the chain is the one closing the loop
    let mut visit = vec![Visit::New; comments.len()];
    let mut path: Vec<usize> = Vec::new();
    for start in 0..comments.len() {
        let mut cur = start;
        loop {
            match visit[cur] {
                Visit::Done => break,
                Visit::InProgress => {
                    if let Some(&last) = path.last() {
                        tracing::debug!(comment = ?comments[last].id, "parent loop, promoting to root");
                        parent[last] = None;
                    }
                    break;
                }
                Visit::New => {
                    visit[cur] = Visit::InProgress;
                    path.push(cur);
                    match parent[cur] {
                        Some(p) => cur = p,
                        None => break,
                    }
                }
            }
        }
        for i in path.drain(..) {
            visit[i] = Visit::Done;
        }
    }

    let mut roots = Vec::new();
    let mut children = vec![Vec::new(); comments.len()];
    for (i, p) in parent.iter().enumerate() {
        match p {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    // Assemble the nodes bottom-up, so that arbitrarily deep threads do not recurse
    let mut postorder = Vec::with_capacity(comments.len());
    let mut stack = roots.iter().rev().map(|r| (*r, false)).collect::<Vec<_>>();
    while let Some((i, expanded)) = stack.pop() {
        if expanded {
            postorder.push(i);
        } else {
            stack.push((i, true));
            stack.extend(children[i].iter().rev().map(|c| (*c, false)));
        }
    }
    let mut built: Vec<Option<Arc<CommentNode>>> = (0..comments.len()).map(|_| None).collect();
    for i in postorder {
        let mut node = CommentNode::new(comments[i].clone());
        node.children = children[i].iter().filter_map(|c| built[*c].take()).collect();
        built[i] = Some(Arc::new(node));
    }
    roots.into_iter().filter_map(|r| built[r].take()).collect()
}
