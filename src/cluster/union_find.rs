///////////////////////////////
/// Disjoint sets over read indices, with path halving and union by rank
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub fn find(&mut self, x: usize) -> usize {
        let mut current = x;
        while self.parent[current] != current {
            let grandparent = self.parent[self.parent[current]];
            self.parent[current] = grandparent;
            current = grandparent;
        }
        current
    }

    /// Join the sets of x and y. Returns true if they were separate
    pub fn union(&mut self, x: usize, y: usize) -> bool {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return false;
        }

        let (smaller, larger) = if self.rank[root_x] < self.rank[root_y] {
            (root_x, root_y)
        } else {
            (root_y, root_x)
        };
        self.parent[smaller] = larger;
        if self.rank[smaller] == self.rank[larger] {
            self.rank[larger] += 1;
        }
        true
    }
}
