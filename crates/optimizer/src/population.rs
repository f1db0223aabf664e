use core_types::{GENE_DIMENSION, Genome};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Samples `size` genomes with every gene uniform in [-1, 1].
pub fn random_population<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Vec<Genome> {
    (0..size)
        .map(|_| {
            let mut genes = [0.0; GENE_DIMENSION];
            for gene in genes.iter_mut() {
                *gene = rng.random_range(-1.0..=1.0);
            }
            Genome::new(genes)
        })
        .collect()
}

/// Copies `parent` and adds independent noise to each of its genes.
pub fn mutate<R: Rng + ?Sized>(parent: &Genome, noise: &Normal<f64>, rng: &mut R) -> Genome {
    let mut child = *parent;
    for gene in child.genes_mut().iter_mut() {
        *gene += noise.sample(rng);
    }
    child
}

/// Refills the population to `size`.
///
/// Survivors are carried over unchanged and in order; each remaining slot is a
/// mutated copy of a survivor picked uniformly at random. There is no crossover.
pub fn repopulate<R: Rng + ?Sized>(
    survivors: &[Genome],
    size: usize,
    noise: &Normal<f64>,
    rng: &mut R,
) -> Vec<Genome> {
    let mut next = Vec::with_capacity(size);
    next.extend_from_slice(survivors);
    if survivors.is_empty() {
        return next;
    }
    while next.len() < size {
        let parent = &survivors[rng.random_range(0..survivors.len())];
        next.push(mutate(parent, noise, rng));
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn initial_genes_are_within_unit_box() {
        let mut rng = StdRng::seed_from_u64(1);
        let population = random_population(50, &mut rng);
        assert_eq!(population.len(), 50);
        assert!(
            population
                .iter()
                .flat_map(|g| g.genes().iter())
                .all(|gene| (-1.0..=1.0).contains(gene))
        );
    }

    #[test]
    fn repopulate_keeps_survivors_and_size() {
        let mut rng = StdRng::seed_from_u64(2);
        let noise = Normal::new(0.0, 0.1).unwrap();
        let survivors = random_population(10, &mut rng);
        let next = repopulate(&survivors, 20, &noise, &mut rng);
        assert_eq!(next.len(), 20);
        assert_eq!(&next[..10], &survivors[..]);
    }

    #[test]
    fn zero_sigma_mutation_is_a_copy() {
        let mut rng = StdRng::seed_from_u64(3);
        let noise = Normal::new(0.0, 0.0).unwrap();
        let parent = Genome::new([0.1, -0.2, 0.3, -0.4, 0.5]);
        assert_eq!(mutate(&parent, &noise, &mut rng), parent);
    }
}
