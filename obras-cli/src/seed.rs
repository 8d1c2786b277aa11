//! Demo site: one logistics-warehouse project mid-execution, with the
//! installations package blocked on an execution error and a rejected
//! signature on file.

use chrono::{DateTime, Duration, Utc};
use obras_core::{
    BlockCause, Blocking, ClimateZone, LandType, Priority, Project, ProjectStatus, Role,
    Signature, Task, TaskStatus,
};

use crate::state::{Employee, SiteState, UserAccount};

pub fn demo_site(now: DateTime<Utc>) -> SiteState {
    SiteState {
        project: demo_project(now),
        employees: demo_employees(now),
        users: demo_users(),
    }
}

fn demo_users() -> Vec<UserAccount> {
    vec![
        user("admin", "Administración Central", Role::Administrator),
        user("jefe", "Marta Ferrandis (jefa de obra)", Role::ProjectManager),
        user("oficina", "Oficina Técnica - Planificación", Role::TechnicalOffice),
        user("op-1", "Andrés Peña (oficial 1ª)", Role::Worker),
        user("op-2", "Lucía Romero (oficial 2ª)", Role::Worker),
    ]
}

fn user(id: &str, name: &str, role: Role) -> UserAccount {
    UserAccount {
        id: id.to_string(),
        full_name: name.to_string(),
        role,
    }
}

fn demo_employees(now: DateTime<Utc>) -> Vec<Employee> {
    let emp = |id: &str, name: &str, course: &str, expires_in_days: i64| Employee {
        id: id.to_string(),
        full_name: name.to_string(),
        prl_course: course.to_string(),
        prl_expires: now + Duration::days(expires_in_days),
    };
    vec![
        emp("jefe", "Marta Ferrandis", "PRL nivel básico 60h", 300),
        emp("oficina", "Oficina Técnica", "PRL nivel básico 60h", 210),
        emp("op-1", "Andrés Peña", "Trabajo en altura", 120),
        // Lapsed on purpose: starting a task assigned to op-2 must fail.
        emp("op-2", "Lucía Romero", "Manejo de maquinaria", -15),
    ]
}

fn demo_project(now: DateTime<Utc>) -> Project {
    let start = now - Duration::days(90);
    let mut p = Project::new("nave-sector-3", "Nave Logística Sector 3")
        .with_location("Alicante", "Elche")
        .with_climate_zone(ClimateZone::B3)
        .with_budget(3_150_000.0);
    p.status = ProjectStatus::InProgress;
    p.land_type = LandType::Urban;

    let joint = |id: &str, name: &str, desc: &str| {
        Task::new(id, name)
            .with_description(desc)
            .with_assignees(["jefe", "oficina"])
            .with_joint_signature()
    };

    let mut plan = joint(
        "planificacion",
        "Planificación y replanteo",
        "Actas de replanteo, implantación de obra y validación técnica inicial",
    )
    .with_priority(Priority::Critical)
    .with_estimate(38_000.0)
    .with_actual_cost(36_500.0)
    .with_planned_window(start, start + Duration::days(25));
    plan.status = TaskStatus::Finished;
    plan.completed_by = Some("jefe".to_string());
    plan.completed_at = Some(start + Duration::days(23));
    // Joint task closed in the past: both assignees approved.
    for signer in ["jefe", "oficina"] {
        plan.signatures.push(approval(
            signer,
            start + Duration::days(22),
            "Conforme a planificación y control de calidad",
        ));
    }

    let mut estructura = joint(
        "estructura",
        "Estructura y cimentación",
        "Cimentación, armado, hormigonado y control estructural",
    )
    .with_priority(Priority::Critical)
    .with_estimate(520_000.0)
    .with_actual_cost(298_000.0)
    .with_planned_window(start + Duration::days(20), start + Duration::days(120));
    estructura.status = TaskStatus::InProgress;
    estructura.signatures.push(approval(
        "jefe",
        now - Duration::days(5),
        "Avance validado en comité semanal",
    ));

    let cerramientos = joint(
        "cerramientos",
        "Cerramientos y envolvente",
        "Fachada, cubierta y aislamiento térmico-acústico",
    )
    .with_priority(Priority::High)
    .with_estimate(330_000.0)
    .with_actual_cost(18_000.0);

    let mut instalaciones = joint(
        "instalaciones",
        "Instalaciones técnicas",
        "Electricidad, fontanería, PCI, climatización y telecomunicaciones",
    )
    .with_priority(Priority::High)
    .with_estimate(295_000.0)
    .with_actual_cost(32_500.0);
    instalaciones.status = TaskStatus::Blocked;
    instalaciones.blockings.push(Blocking {
        cause: BlockCause::ExecutionError,
        justification: "Incompatibilidad detectada entre bandejas eléctricas y pasos de \
                        instalaciones hidráulicas. Requiere nueva propuesta técnica."
            .to_string(),
        opened_at: now - Duration::days(2),
        resolved_at: None,
    });
    // Prior rejection on record; a later approval may supersede it.
    instalaciones.signatures.push(Signature {
        user_id: "oficina".to_string(),
        signed_at: now - Duration::days(3),
        approved: false,
        rejection_reason: Some(
            "Pendiente replanteo de canalizaciones y coordinación con estructura existente"
                .to_string(),
        ),
        notes: Some("Se detectan incompatibilidades con trazado de instalaciones".to_string()),
    });

    let acabados = joint(
        "acabados",
        "Acabados y legalización",
        "Acabados finales, remates, pruebas y tramitación de cierre",
    )
    .with_estimate(240_000.0);

    let entrega = joint(
        "entrega",
        "Entrega y cierre de obra",
        "As-built, certificación final y acta de entrega",
    )
    .with_estimate(78_000.0);

    let mut cimentacion = Task::new("cimentacion", "Cimentación profunda")
        .with_description("Pilotes, encepados y losa de cimentación")
        .with_priority(Priority::High)
        .with_estimate(165_000.0)
        .with_actual_cost(118_000.0)
        .with_assignees(["op-1", "jefe"]);
    cimentacion.status = TaskStatus::InProgress;

    let vertical = Task::new("estructura-vertical", "Estructura vertical y forjados")
        .with_description("Pilares, vigas y forjados de plantas tipo")
        .with_priority(Priority::High)
        .with_estimate(245_000.0)
        .with_actual_cost(36_000.0)
        .with_assignees(["op-1", "op-2", "jefe"]);

    let mut electrica = Task::new("electrica", "Instalación eléctrica BT")
        .with_description("Bandejas, cableado y cuadros de planta")
        .with_priority(Priority::High)
        .with_estimate(92_000.0)
        .with_actual_cost(15_800.0)
        .with_assignees(["op-2", "oficina"]);
    electrica.status = TaskStatus::Blocked;
    electrica.blockings.push(Blocking {
        cause: BlockCause::ExecutionError,
        justification: "Paralizada junto al paquete de instalaciones".to_string(),
        opened_at: now - Duration::days(2),
        resolved_at: None,
    });

    let fontaneria = Task::new("fontaneria", "Fontanería y saneamiento")
        .with_description("Redes verticales/horizontales y pruebas de estanqueidad")
        .with_estimate(76_000.0)
        .with_assignees(["op-1", "oficina"]);

    for t in [plan, estructura, cerramientos, instalaciones, acabados, entrega] {
        p.tasks.insert(t).expect("seed ids are unique");
    }
    for (parent, t) in [
        ("estructura", cimentacion),
        ("estructura", vertical),
        ("instalaciones", electrica),
        ("instalaciones", fontaneria),
    ] {
        let id = t.id.clone();
        p.tasks.insert(t).expect("seed ids are unique");
        p.tasks.attach_child(parent, &id).expect("seed parents exist");
    }

    // Top-level chain.
    for (task, pred) in [
        ("estructura", "planificacion"),
        ("cerramientos", "estructura"),
        ("instalaciones", "cerramientos"),
        ("acabados", "instalaciones"),
        ("entrega", "acabados"),
    ] {
        p.tasks.add_predecessor(task, pred).expect("seed edges are acyclic");
    }
    // Sub-task chain, one edge crossing subtrees.
    p.tasks
        .add_predecessor("estructura-vertical", "cimentacion")
        .expect("seed edges are acyclic");
    p.tasks
        .add_predecessor("electrica", "cerramientos")
        .expect("seed edges are acyclic");
    p.tasks
        .add_predecessor("fontaneria", "electrica")
        .expect("seed edges are acyclic");

    p
}

fn approval(user: &str, at: DateTime<Utc>, notes: &str) -> Signature {
    Signature {
        user_id: user.to_string(),
        signed_at: at,
        approved: true,
        rejection_reason: None,
        notes: Some(notes.to_string()),
    }
}
