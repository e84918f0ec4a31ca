//! Local register allocation.
//!
//! The allocator is iterative and local: each block is allocated with empty
//! register bindings, so values that cross block boundaries always travel
//! through stack slots. Spill code introduces fresh virtual registers, and
//! rather than patching the analysis incrementally the whole function is
//! re-analysed and re-allocated until a sweep introduces nothing new
//! (typically two or three sweeps).
//!
//! Victim selection on eviction is the one source of randomness; the RNG is
//! seedable so compilation stays reproducible.

use alloc::{
    collections::{BTreeMap, BTreeSet},
    vec::Vec,
};

use rand::{rngs::SmallRng, Rng, SeedableRng};
use tac_ir::Temp;

use crate::{
    cfg::ControlFlowGraph,
    debug_regalloc,
    inst::{is_imm12, NativeInst},
    liveness::{compute_inst_liveness, BlockLiveness, InstLiveness},
    program::{NativeFunc, StackObject, StackSlot},
    regs::{ALLOCATABLE, ARG_REGS, FP, WORD_SIZE},
};

const DEFAULT_SEED: u64 = 0xa110c;

/// Allocates physical registers for one function at a time.
///
/// Internal state (stack objects, slot mapping, RNG) is reset at the start
/// of every [`run`](LocalRegAllocator::run), so one allocator value can be
/// reused across functions.
pub struct LocalRegAllocator {
    rng: SmallRng,
    seed: u64,
    /// Stack objects in order of first spill.
    stack_objects: Vec<StackObject>,
    /// Spilled virtual register -> its stack slot.
    stack_slots: BTreeMap<Temp, StackSlot>,
}

impl LocalRegAllocator {
    /// Create an allocator with the default seed.
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Create an allocator with an explicit RNG seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            seed,
            stack_objects: Vec::new(),
            stack_slots: BTreeMap::new(),
        }
    }

    /// Get the stack slot for a virtual register, allocating one on demand.
    fn stack_slot(&mut self, vreg: Temp) -> StackSlot {
        if let Some(&slot) = self.stack_slots.get(&vreg) {
            return slot;
        }
        let slot = StackSlot::new(self.stack_objects.len() as u32);
        self.stack_objects.push(StackObject::new(WORD_SIZE));
        self.stack_slots.insert(vreg, slot);
        slot
    }

    /// Allocate physical registers for every virtual register in `func`,
    /// inserting spill and reload code as needed.
    ///
    /// On return every instruction operand is physical and the function
    /// carries its stack objects.
    pub fn run(&mut self, func: &mut NativeFunc) {
        self.rng = SmallRng::seed_from_u64(self.seed);
        self.stack_objects.clear();
        self.stack_slots.clear();

        let mut sweeps = 0usize;
        loop {
            sweeps += 1;
            let cfg = ControlFlowGraph::compute(func);
            let (block_liveness, inst_liveness) = compute_inst_liveness(func, &cfg);

            for i in 0..func.blocks.len() {
                let instrs = core::mem::take(&mut func.blocks[i].instrs);
                func.blocks[i].instrs = self.alloc_block(
                    instrs,
                    &block_liveness[i],
                    &inst_liveness[i],
                    i == 0,
                    func.num_params,
                );
            }

            let mut done = true;
            for i in 0..func.blocks.len() {
                done &= expand_stack_ops(func, i);
            }
            if done {
                break;
            }
        }
        debug_regalloc!(
            "{}: converged after {} sweeps, {} stack objects",
            func.name,
            sweeps,
            self.stack_objects.len()
        );
        let _ = sweeps;

        func.stack_slots = core::mem::take(&mut self.stack_objects);
    }

    /// Allocate one block. Bindings start empty: the local allocator assumes
    /// nothing about predecessor register state.
    fn alloc_block(
        &mut self,
        instrs: Vec<NativeInst>,
        bl: &BlockLiveness,
        il: &InstLiveness,
        is_entry: bool,
        num_params: usize,
    ) -> Vec<NativeInst> {
        let mut phys2virt: BTreeMap<Temp, Temp> = BTreeMap::new();
        let mut virt2phys: BTreeMap<Temp, Temp> = BTreeMap::new();

        // Parameters arrive in a0-a7; pre-bind them in the entry block so a
        // use does not reload garbage from an unwritten slot.
        if is_entry {
            for (k, &p) in ARG_REGS.iter().enumerate().take(num_params) {
                let v = Temp::new(k as i32 + 1);
                phys2virt.insert(p, v);
                virt2phys.insert(v, p);
            }
        }

        let mut buf: Vec<NativeInst> = Vec::with_capacity(instrs.len());
        for (j, mut instr) in instrs.into_iter().enumerate() {
            let live_out = &il.live_out_seqs[j];
            // Registers handed to this instruction, both phases. Excluded
            // from unbinding and from victim candidacy so that a source is
            // never clobbered before the instruction reads it.
            let mut taken: BTreeSet<Temp> = BTreeSet::new();
            let mut mapping: Vec<(Temp, Temp)> = Vec::new();

            // Sources first, then destinations: a destination must not evict
            // a still-needed source.
            let phases = [(instr.uses(), true), (instr.defs(), false)];
            for (regs, need_load) in phases {
                for v in regs.into_iter().filter(|r| r.is_virtual()) {
                    if let Some(&p) = virt2phys.get(&v) {
                        taken.insert(p);
                        mapping.push((v, p));
                        continue;
                    }

                    let p = match find_free_reg(
                        &mut phys2virt,
                        &mut virt2phys,
                        live_out,
                        &taken,
                    ) {
                        Some(p) => p,
                        None => {
                            // No register left; evict a random victim. The
                            // free scan has already dropped dead bindings,
                            // so every candidate holds a live value.
                            let candidates: Vec<Temp> = ALLOCATABLE
                                .iter()
                                .copied()
                                .filter(|p| phys2virt.contains_key(p) && !taken.contains(p))
                                .collect();
                            if candidates.is_empty() {
                                // All pressure is from physical registers:
                                // possible only for the short-lived address
                                // temps of the expansion pass. FP is kept
                                // out of the allocatable set exactly so it
                                // is available here.
                                if let Some(prev) = phys2virt.remove(&FP) {
                                    assert!(
                                        !live_out.contains(&prev),
                                        "FP scratch holds live value {}",
                                        prev
                                    );
                                    virt2phys.remove(&prev);
                                }
                                assert!(
                                    !live_out.contains(&FP) && !taken.contains(&FP),
                                    "FP scratch unavailable for {}",
                                    v
                                );
                                FP
                            } else {
                                let p = candidates[self.rng.gen_range(0..candidates.len())];
                                let victim = phys2virt[&p];
                                let slot = self.stack_slot(victim);
                                buf.push(NativeInst::StackStore {
                                    src: p,
                                    slot,
                                    offset: 0,
                                });
                                phys2virt.remove(&p);
                                virt2phys.remove(&victim);
                                p
                            }
                        }
                    };

                    phys2virt.insert(p, v);
                    virt2phys.insert(v, p);
                    taken.insert(p);
                    mapping.push((v, p));
                    if need_load {
                        let slot = self.stack_slot(v);
                        buf.push(NativeInst::StackLoad {
                            dst: p,
                            slot,
                            offset: 0,
                        });
                    }
                }
            }

            // Both phases are recorded; substitute in one go so a source is
            // never replaced before it has been read off the instruction.
            for (v, p) in mapping {
                instr.replace_operand(v, p);
            }
            buf.push(instr);
        }

        // Values live out of the block must survive in memory: spill every
        // virtual register still bound. The spills go in front of the
        // terminator so they execute on every outgoing edge.
        let mut spills = Vec::new();
        for v in &bl.live_out {
            if let Some(&p) = virt2phys.get(v) {
                let slot = self.stack_slot(*v);
                spills.push(NativeInst::StackStore {
                    src: p,
                    slot,
                    offset: 0,
                });
            }
        }
        let at = match buf.last() {
            Some(last) if last.is_terminator() => buf.len() - 1,
            _ => buf.len(),
        };
        buf.splice(at..at, spills);
        buf
    }
}

impl Default for LocalRegAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan the allocatable registers in their fixed order for one that can hold
/// a new value at this program point. Bindings whose virtual register is
/// dead past the instruction are silently dropped along the way.
///
/// A register is usable only if it is unbound and not itself live here:
/// liveness tracks physical registers too, and a physically live register
/// holds a value the instruction stream still reads.
fn find_free_reg(
    phys2virt: &mut BTreeMap<Temp, Temp>,
    virt2phys: &mut BTreeMap<Temp, Temp>,
    live_out: &BTreeSet<Temp>,
    taken: &BTreeSet<Temp>,
) -> Option<Temp> {
    for p in ALLOCATABLE {
        if taken.contains(&p) {
            continue;
        }
        if let Some(&v) = phys2virt.get(&p) {
            if !live_out.contains(&v) {
                phys2virt.remove(&p);
                virt2phys.remove(&v);
            }
        }
        if !phys2virt.contains_key(&p) && !live_out.contains(&p) {
            return Some(p);
        }
    }
    None
}

/// Conservatively rewrite stack ops whose final offset may not fit imm12.
///
/// Every `StackStore` becomes `LoadStackAddr` + `Store` through a fresh
/// virtual register, and a huge `SPAdd` without an auxiliary register gets
/// one materialised. Returns `false` when anything was rewritten: new
/// virtuals need another allocation sweep.
fn expand_stack_ops(func: &mut NativeFunc, block_index: usize) -> bool {
    let instrs = core::mem::take(&mut func.blocks[block_index].instrs);
    let mut buf: Vec<NativeInst> = Vec::with_capacity(instrs.len());
    let mut ok = true;

    for instr in instrs {
        match instr {
            NativeInst::StackStore { src, slot, offset } => {
                ok = false;
                let addr = func.new_temp();
                buf.push(NativeInst::LoadStackAddr {
                    dst: addr,
                    slot,
                    offset,
                });
                buf.push(NativeInst::Store {
                    src,
                    base: addr,
                    offset: 0,
                });
            }
            NativeInst::SPAdd { delta, src: None } if !is_imm12(delta) => {
                ok = false;
                let tmp = func.new_temp();
                buf.push(NativeInst::LoadImm32 {
                    dst: tmp,
                    value: delta,
                });
                buf.push(NativeInst::SPAdd {
                    delta,
                    src: Some(tmp),
                });
            }
            other => buf.push(other),
        }
    }

    func.blocks[block_index].instrs = buf;
    ok
}
